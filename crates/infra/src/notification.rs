//! # メールトランスポート
//!
//! メール送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationTransport` trait でメール送信を抽象化
//! - **3 つの実装**: ホスト API（トランザクションメール）、Gmail リレー、
//!   Outlook リレー
//! - **例外を漏らさない**: トランスポート内部の失敗はすべて
//!   [`NotificationError::SendFailed`] に変換される。呼び出し側
//!   （ディスパッチャ）が最終的にこれを握りつぶす
//!
//! Gmail / Outlook の SMTP 認証は別プロセスのローカルリレーが担う。
//! ここでの仕事はリクエストペイロードの整形と HTTP レスポンスの解釈のみ。

mod gmail_relay;
mod hosted_api;
mod outlook_relay;

use async_trait::async_trait;
pub use gmail_relay::GmailRelayTransport;
pub use hosted_api::HostedApiTransport;
pub use outlook_relay::OutlookRelayTransport;
use recut_domain::notification::{EmailContent, EmailRecipients, NotificationError};

/// メール送信トレイト
///
/// 通知基盤の中核。メール送信の具体的な経路を抽象化する。
/// ホスト API / Gmail リレー / Outlook リレーの 3 実装を
/// 設定のプロバイダータグで切り替える。
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// メールを送信する
    async fn send(
        &self,
        recipients: &EmailRecipients,
        content: &EmailContent,
    ) -> Result<(), NotificationError>;
}

/// メッセージ ID を返すメール送信トレイト
///
/// `/api/send-email` エンドポイントがレスポンスにプロバイダーの
/// メッセージ ID を含めるために使用する。ホスト API のみが実装する
/// （リレーはメッセージ ID を返さない）。
#[async_trait]
pub trait HostedApiSender: Send + Sync {
    /// メールを送信し、プロバイダーのメッセージ ID を返す
    async fn send_returning_id(
        &self,
        recipients: &EmailRecipients,
        content: &EmailContent,
    ) -> Result<String, NotificationError>;
}
