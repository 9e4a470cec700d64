//! # 通知
//!
//! メール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 備考 |
//! |---|------------|------|
//! | [`NotificationKind`] | 通知イベント種別 | 新規依頼 / ステータス更新 / 完了 |
//! | [`EmailProvider`] | メールプロバイダー | 3 種類の送信経路を閉じた enum で表現 |
//! | [`NotificationSettings`] | 通知設定 | 宛先と種別ごとの有効フラグ |
//! | [`EmailContent`] | メール本文 | 送信ごとに生成される一時データ。永続化しない |
//!
//! ## 設計方針
//!
//! - **enum によるプロバイダー選択**: 文字列分岐ではなく閉じたタグ付きバリアントで
//!   送信経路を表現し、ディスパッチャはタグのマッチで経路を選ぶ
//! - **fire-and-forget**: 通知送信の失敗は依頼操作の結果に影響しない
//! - **設定・資格情報は注入**: グローバル状態からの読み出しは行わず、
//!   呼び出し側が起動時に解決した値を渡す

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

/// 通知イベント種別
///
/// snake_case でシリアライズされ、ホスト API エンドポイントの `type`
/// フィールドと同じ文字列表現を持つ。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    /// 新規依頼: 依頼が作成されたとき → 通知先に送信
    NewRequest,
    /// ステータス更新: 依頼のステータスが変更されたとき → 通知先に送信
    StatusUpdate,
    /// 完了: ホスト API エンドポイントのみが受け付ける種別
    ///
    /// アプリ内のディスパッチャからは送信されない。
    Completion,
}

/// メールプロバイダー
///
/// 3 種類の送信経路を閉じたタグ付きバリアントで表現する。
/// 設定文字列からのパースは [`EmailProvider::from_config`] で行い、
/// 未知の値はデフォルト（ホスト API）に倒す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum EmailProvider {
    /// ホスト型トランザクションメール API（デフォルト）
    HostedApi,
    /// Gmail SMTP（ローカルリレー経由）
    GmailRelay,
    /// Outlook SMTP（ローカルリレー経由）
    OutlookRelay,
}

impl EmailProvider {
    /// 設定文字列からプロバイダーを決定する
    ///
    /// `"gmail"` / `"outlook"` を認識し、それ以外（`"hosted_api"` や
    /// 未知の値、未設定）はすべてホスト API にフォールバックする。
    pub fn from_config(value: &str) -> Self {
        match value {
            "gmail" => Self::GmailRelay,
            "outlook" => Self::OutlookRelay,
            _ => Self::HostedApi,
        }
    }
}

/// リレー認証情報
///
/// Gmail / Outlook アカウントのログイン名とアプリパスワードの組。
/// ローカルリレーへのリクエストに埋め込まれる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayCredentials {
    /// アカウント（メールアドレス）
    pub user:         String,
    /// アプリパスワード
    pub app_password: String,
}

/// メール宛先
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailRecipients {
    /// 宛先メールアドレス
    pub to:  Vec<String>,
    /// CC メールアドレス
    pub cc:  Vec<String>,
    /// BCC メールアドレス
    pub bcc: Vec<String>,
}

/// メール本文
///
/// テンプレートレンダリングの出力。トランスポートに渡される一時データで、
/// 送信ごとに生成され、永続化されない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub html_body: String,
    /// プレーンテキスト本文
    pub text_body: String,
}

/// 通知設定
///
/// 宛先リストと通知種別ごとの有効フラグ。ディスパッチのたびに
/// リポジトリから読み直される（キャッシュしない）。
/// プロバイダーの選択はこの構造には含まれず、起動時の設定で決まる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    /// 宛先メールアドレス
    pub recipients:              Vec<String>,
    /// CC メールアドレス
    pub cc_recipients:           Vec<String>,
    /// 新規依頼通知の有効フラグ
    pub notify_on_new_request:   bool,
    /// ステータス更新通知の有効フラグ
    pub notify_on_status_update: bool,
}

impl NotificationSettings {
    /// 指定された通知種別が有効かを返す
    ///
    /// `Completion` はアプリ内ディスパッチの対象外のため、
    /// ステータス更新と同じフラグで判定する。
    pub fn is_enabled(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::NewRequest => self.notify_on_new_request,
            NotificationKind::StatusUpdate | NotificationKind::Completion => {
                self.notify_on_status_update
            }
        }
    }

    /// 設定から宛先を組み立てる
    pub fn email_recipients(&self) -> EmailRecipients {
        EmailRecipients {
            to:  self.recipients.clone(),
            cc:  self.cc_recipients.clone(),
            bcc: Vec::new(),
        }
    }
}
