//! # ホスト API 互換メール送信ハンドラ
//!
//! ホスト型トランザクションメールのワイヤー契約をそのまま提供する
//! エンドポイント。レスポンス形式はサービス共通の `{ "data": ... }`
//! エンベロープではなく、元の形式（`{"success": ...}` / `{"error": ...}`）
//! を維持する。
//!
//! ## ワイヤー契約
//!
//! ```text
//! POST /api/send-email
//! Body: { to: string | string[], cc?: string | string[],
//!         damageRequest: {...}, type?: "new_request" | "status_update" | "completion" }
//!
//! 200 { "success": true, "messageId": "...", "message": "Email sent successfully" }
//! 400 { "error": "Missing required fields: to, damageRequest" }
//! 500 { "error": "Failed to send email", "details": "..." }
//! 500 { "error": "Internal server error", "message": "..." }
//! ```
//!
//! `OPTIONS`（CORS プリフライト）はルーターの `CorsLayer` が 200 で応答する。
//! POST / OPTIONS 以外のメソッドは axum が 405 を返す。

use std::{str::FromStr, sync::Arc};

use axum::{
   Json,
   extract::State,
   http::StatusCode,
   response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use recut_domain::{
   damage_request::{DamageRequest, DamageRequestId, DamageRequestRecord, PanelInfo, RequestStatus},
   notification::{EmailProvider, EmailRecipients, NotificationKind},
};
use recut_infra::notification::HostedApiSender;
use serde::Deserialize;
use serde_json::json;

use crate::usecase::TemplateRenderer;

/// メール送信ハンドラーの State
pub struct SendEmailState {
   pub renderer: TemplateRenderer,
   /// ホスト API のトランスポート。API キー未設定の場合は `None` で、
   /// 送信要求は 500 になる
   pub mailer:   Option<Arc<dyn HostedApiSender>>,
}

/// 文字列または文字列配列を受け付けるフィールド
///
/// 元のワイヤー契約は `to` / `cc` にスカラーと配列の両方を許す。
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
   One(String),
   Many(Vec<String>),
}

impl StringOrList {
   fn into_vec(self) -> Vec<String> {
      match self {
         Self::One(value) => vec![value],
         Self::Many(values) => values,
      }
   }
}

/// メール送信リクエスト
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequestDto {
   #[serde(default)]
   pub to:             Option<StringOrList>,
   #[serde(default)]
   pub cc:             Option<StringOrList>,
   #[serde(default)]
   pub damage_request: Option<EmailDamageRequestDto>,
   #[serde(default, rename = "type")]
   pub kind:           Option<String>,
}

/// リクエストボディに埋め込まれるリカット依頼
///
/// クライアントからの入力は欠けていてもよい。欠けたフィールドは
/// 空値・現在時刻で補う。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDamageRequestDto {
   #[serde(default)]
   pub glider_name:  String,
   #[serde(default)]
   pub order_number: String,
   #[serde(default)]
   pub reason:       String,
   #[serde(default)]
   pub requested_by: String,
   #[serde(default)]
   pub panels:       Vec<PanelInfo>,
   #[serde(default)]
   pub notes:        Option<String>,
   #[serde(default)]
   pub status:       Option<RequestStatus>,
   #[serde(default)]
   pub submitted_at: Option<DateTime<Utc>>,
   #[serde(default)]
   pub updated_at:   Option<DateTime<Utc>>,
}

impl EmailDamageRequestDto {
   fn into_domain(self, now: DateTime<Utc>) -> DamageRequest {
      DamageRequest::from_record(DamageRequestRecord {
         id: DamageRequestId::new(),
         glider_name: self.glider_name,
         order_number: self.order_number,
         reason: self.reason,
         requested_by: self.requested_by,
         panels: self.panels,
         status: self.status.unwrap_or(RequestStatus::Pending),
         submitted_at: self.submitted_at.unwrap_or(now),
         updated_at: self.updated_at.unwrap_or(now),
         notes: self.notes,
      })
   }
}

/// メールを送信する
///
/// ## エンドポイント
/// POST /api/send-email
pub async fn send_email(
   State(state): State<Arc<SendEmailState>>,
   Json(dto): Json<SendEmailRequestDto>,
) -> Response {
   // 必須フィールドの検証（どちらが欠けても同じメッセージを返す）
   let (Some(to), Some(damage_request)) = (dto.to, dto.damage_request) else {
      return (
         StatusCode::BAD_REQUEST,
         Json(json!({ "error": "Missing required fields: to, damageRequest" })),
      )
         .into_response();
   };

   let request = damage_request.into_domain(Utc::now());
   let recipients = EmailRecipients {
      to:  to.into_vec(),
      cc:  dto.cc.map(StringOrList::into_vec).unwrap_or_default(),
      bcc: Vec::new(),
   };

   // type が未知・未指定の場合も送信は行う（汎用の件名になる）
   let kind = dto
      .kind
      .as_deref()
      .and_then(|value| NotificationKind::from_str(value).ok());

   let content = match kind {
      Some(kind) => state.renderer.render(EmailProvider::HostedApi, kind, &request),
      None => state.renderer.render_hosted_fallback(&request),
   };

   let content = match content {
      Ok(content) => content,
      Err(e) => {
         tracing::error!(error = %e, "メール本文の生成に失敗");
         return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error", "message": e.to_string() })),
         )
            .into_response();
      }
   };

   let Some(mailer) = &state.mailer else {
      return (
         StatusCode::INTERNAL_SERVER_ERROR,
         Json(json!({
            "error": "Failed to send email",
            "details": "ホスト API の API キーが未設定です"
         })),
      )
         .into_response();
   };

   match mailer.send_returning_id(&recipients, &content).await {
      Ok(message_id) => (
         StatusCode::OK,
         Json(json!({
            "success": true,
            "messageId": message_id,
            "message": "Email sent successfully"
         })),
      )
         .into_response(),
      Err(e) => {
         tracing::error!(error = %e, "メール送信に失敗");
         (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to send email", "details": e.to_string() })),
         )
            .into_response()
      }
   }
}
