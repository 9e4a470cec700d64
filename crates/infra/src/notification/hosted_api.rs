//! ホスト API トランスポート実装
//!
//! ホスト型トランザクションメール API（Resend 互換）に HTTP で送信する。
//! デフォルトのプロバイダーとして使用される。

use async_trait::async_trait;
use recut_domain::notification::{EmailContent, EmailRecipients, NotificationError};
use serde::{Deserialize, Serialize};

use super::{HostedApiSender, NotificationTransport};

/// ホスト API トランスポート
///
/// `POST {api_base}/emails` への単一の HTTP 呼び出しでメールを送信する。
/// 送信元は表示名付きの構造化アドレス（`"会社名 <アドレス>"`）。
pub struct HostedApiTransport {
    client:       reqwest::Client,
    api_base:     String,
    api_key:      String,
    from_address: String,
    company_name: String,
}

/// ホスト API への送信リクエスト
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from:    String,
    to:      &'a [String],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    cc:      &'a [String],
    subject: &'a str,
    html:    &'a str,
    text:    &'a str,
}

/// ホスト API からの成功レスポンス
#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    /// プロバイダー側のメッセージ ID
    id: Option<String>,
}

impl HostedApiTransport {
    /// 新しいホスト API トランスポートを作成
    ///
    /// # 引数
    ///
    /// - `api_base`: API のベース URL（例: `https://api.resend.com`）
    /// - `api_key`: API キー（Bearer トークン）
    /// - `from_address`: 送信元メールアドレス
    /// - `company_name`: 送信元の表示名
    pub fn new(
        api_base: &str,
        api_key: String,
        from_address: String,
        company_name: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            from_address,
            company_name,
        }
    }
}

#[async_trait]
impl HostedApiSender for HostedApiTransport {
    async fn send_returning_id(
        &self,
        recipients: &EmailRecipients,
        content: &EmailContent,
    ) -> Result<String, NotificationError> {
        let request = SendEmailRequest {
            from:    format!("{} <{}>", self.company_name, self.from_address),
            to:      &recipients.to,
            cc:      &recipients.cc,
            subject: &content.subject,
            html:    &content.html_body,
            text:    &content.text_body,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(format!("ホスト API への接続に失敗: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::SendFailed(format!(
                "ホスト API がエラーを返却: {status} - {body}"
            )));
        }

        let body: SendEmailResponse = response.json().await.map_err(|e| {
            NotificationError::SendFailed(format!("ホスト API レスポンスの解析に失敗: {e}"))
        })?;

        Ok(body.id.unwrap_or_default())
    }
}

#[async_trait]
impl NotificationTransport for HostedApiTransport {
    async fn send(
        &self,
        recipients: &EmailRecipients,
        content: &EmailContent,
    ) -> Result<(), NotificationError> {
        self.send_returning_id(recipients, content).await?;
        Ok(())
    }
}
