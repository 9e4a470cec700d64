//! # Recut Service 設定
//!
//! 環境変数から Recut Service サーバーの設定を読み込む。
//!
//! 通知まわりの設定（プロバイダー選択・各プロバイダーの資格情報）は
//! 起動時にここで一度だけ解決され、ディスパッチャに注入される。
//! ディスパッチ時にグローバル状態を読みに行くことはない。

use std::env;

use recut_domain::notification::{EmailProvider, RelayCredentials};

/// Recut Service サーバーの設定
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// データベース接続 URL
    pub database_url: String,
    /// 通知設定
    pub notification: NotificationConfig,
}

/// 通知機能の設定
///
/// `EMAIL_PROVIDER` 環境変数で送信経路を切り替える:
/// - `hosted_api`: ホスト型トランザクションメール API（デフォルト）
/// - `gmail`: Gmail SMTP（ローカルリレー経由）
/// - `outlook`: Outlook SMTP（ローカルリレー経由）
///
/// 選択されたプロバイダーの資格情報が未設定の場合、通知は黙って
/// スキップされる（依頼操作は通常どおり成功する）。
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// 選択されたメールプロバイダー
    pub provider:        EmailProvider,
    /// 送信元メールアドレス（ホスト API で使用）
    pub from_address:    String,
    /// 送信元の表示名
    pub company_name:    String,
    /// ホスト API の API キー
    pub resend_api_key:  Option<String>,
    /// ホスト API のベース URL
    pub resend_api_base: String,
    /// ローカルリレーのベース URL
    pub relay_base_url:  String,
    /// Gmail の資格情報（ユーザーとアプリパスワードが揃った場合のみ）
    pub gmail:           Option<RelayCredentials>,
    /// Outlook の資格情報（ユーザーとアプリパスワードが揃った場合のみ）
    pub outlook:         Option<RelayCredentials>,
}

impl ServiceConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            host: env::var("RECUT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("RECUT_PORT")
                .expect("RECUT_PORT が設定されていません")
                .parse()
                .expect("RECUT_PORT は有効なポート番号である必要があります"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL が設定されていません"),
            notification: NotificationConfig::from_env(),
        })
    }
}

impl NotificationConfig {
    /// 環境変数から通知設定を読み込む
    fn from_env() -> Self {
        Self {
            provider:        EmailProvider::from_config(
                &env::var("EMAIL_PROVIDER").unwrap_or_default(),
            ),
            from_address:    env::var("NOTIFICATION_FROM_ADDRESS")
                .unwrap_or_else(|_| "noreply@aquadynamics.example.com".to_string()),
            company_name:    env::var("COMPANY_NAME")
                .unwrap_or_else(|_| "Aqua Dynamics".to_string()),
            resend_api_key:  env::var("RESEND_API_KEY").ok(),
            resend_api_base: env::var("RESEND_API_BASE")
                .unwrap_or_else(|_| "https://api.resend.com".to_string()),
            relay_base_url:  env::var("RELAY_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            gmail:           relay_credentials("GMAIL_USER", "GMAIL_APP_PASSWORD"),
            outlook:         relay_credentials("OUTLOOK_USER", "OUTLOOK_APP_PASSWORD"),
        }
    }
}

/// ユーザーとアプリパスワードの両方が設定されている場合のみ資格情報を返す
fn relay_credentials(user_var: &str, password_var: &str) -> Option<RelayCredentials> {
    let user = env::var(user_var).ok()?;
    let app_password = env::var(password_var).ok()?;
    Some(RelayCredentials { user, app_password })
}
