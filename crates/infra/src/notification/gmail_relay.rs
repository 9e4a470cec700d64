//! Gmail リレートランスポート実装
//!
//! Gmail アカウントとアプリパスワードで SMTP 送信する別プロセスの
//! ローカルリレーに HTTP でペイロードを渡す。SMTP 認証そのものは
//! リレー側の責務で、ここでは行わない。

use async_trait::async_trait;
use recut_domain::notification::{
    EmailContent,
    EmailRecipients,
    NotificationError,
    RelayCredentials,
};
use serde::Serialize;

use super::NotificationTransport;

/// Gmail リレートランスポート
///
/// `POST {base_url}/api/send-email` に認証情報とメッセージを送る。
/// 2xx 以外のレスポンスは送信失敗として扱う。
pub struct GmailRelayTransport {
    client:      reqwest::Client,
    base_url:    String,
    credentials: RelayCredentials,
}

/// リレーへの送信リクエスト
#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    gmail: RelayAuth<'a>,
    email: RelayEmail<'a>,
}

/// リレーに渡す認証情報
#[derive(Debug, Serialize)]
struct RelayAuth<'a> {
    user:         &'a str,
    #[serde(rename = "appPassword")]
    app_password: &'a str,
}

/// リレーに渡すメッセージフィールド
#[derive(Debug, Serialize)]
struct RelayEmail<'a> {
    from:    &'a str,
    to:      &'a [String],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    cc:      &'a [String],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    bcc:     &'a [String],
    subject: &'a str,
    html:    &'a str,
    text:    &'a str,
}

impl GmailRelayTransport {
    /// 新しい Gmail リレートランスポートを作成
    ///
    /// # 引数
    ///
    /// - `base_url`: リレーのベース URL（例: `http://localhost:3001`）
    /// - `credentials`: Gmail アカウントとアプリパスワード
    pub fn new(base_url: &str, credentials: RelayCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }
}

#[async_trait]
impl NotificationTransport for GmailRelayTransport {
    async fn send(
        &self,
        recipients: &EmailRecipients,
        content: &EmailContent,
    ) -> Result<(), NotificationError> {
        let request = RelayRequest {
            gmail: RelayAuth {
                user:         &self.credentials.user,
                app_password: &self.credentials.app_password,
            },
            email: RelayEmail {
                from:    &self.credentials.user,
                to:      &recipients.to,
                cc:      &recipients.cc,
                bcc:     &recipients.bcc,
                subject: &content.subject,
                html:    &content.html_body,
                text:    &content.text_body,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/send-email", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                NotificationError::SendFailed(format!("Gmail リレーへの接続に失敗: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::SendFailed(format!(
                "Gmail リレーがエラーを返却: {status} - {body}"
            )));
        }

        Ok(())
    }
}
