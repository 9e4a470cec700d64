//! # 通知ディスパッチャ
//!
//! 通知設定の判定 → プロバイダー選択 → テンプレートレンダリング →
//! メール送信を統合するサービス。
//!
//! ## 設計方針
//!
//! - **fire-and-forget**: [`NotificationDispatcher::dispatch`] はバックグラウンド
//!   タスクを起動してすぐ戻る。結果はログに残るだけで、呼び出し元が await する
//!   ことはない。再送もバックオフもしない（at-most-once）
//! - **エラーを返さない**: [`NotificationDispatcher::notify`] の戻り値は `()`。
//!   どのステップで失敗してもログ出力のみで終わる。すでにコミット済みの
//!   依頼操作が通知のせいで失敗して見えることは決してない
//! - **タグによる経路選択**: プロバイダーは閉じた enum のマッチで選ぶ。
//!   設定文字列の分岐はここには現れない
//! - **設定は毎回読み直す**: 通知設定はディスパッチのたびにリポジトリから
//!   取得する。キャッシュしない

use std::sync::Arc;

use recut_domain::{
    damage_request::DamageRequest,
    notification::{EmailProvider, NotificationKind},
};
use recut_infra::{
    notification::{
        GmailRelayTransport,
        HostedApiTransport,
        NotificationTransport,
        OutlookRelayTransport,
    },
    repository::NotificationSettingsRepository,
};
use recut_shared::{event_log::event, log_business_event};

use super::TemplateRenderer;
use crate::config::NotificationConfig;

/// プロバイダーごとのトランスポート
///
/// 資格情報が揃っていないプロバイダーのスロットは `None` になり、
/// そのプロバイダーが選択されている場合の通知は黙ってスキップされる。
pub struct ProviderTransports {
    pub hosted_api:    Option<Arc<dyn NotificationTransport>>,
    pub gmail_relay:   Option<Arc<dyn NotificationTransport>>,
    pub outlook_relay: Option<Arc<dyn NotificationTransport>>,
}

impl ProviderTransports {
    /// 起動時の設定からトランスポートを構築する
    pub fn from_config(config: &NotificationConfig) -> Self {
        let hosted_api: Option<Arc<dyn NotificationTransport>> =
            config.resend_api_key.as_ref().map(|api_key| {
                Arc::new(HostedApiTransport::new(
                    &config.resend_api_base,
                    api_key.clone(),
                    config.from_address.clone(),
                    config.company_name.clone(),
                )) as Arc<dyn NotificationTransport>
            });

        let gmail_relay: Option<Arc<dyn NotificationTransport>> =
            config.gmail.as_ref().map(|credentials| {
                Arc::new(GmailRelayTransport::new(
                    &config.relay_base_url,
                    credentials.clone(),
                )) as Arc<dyn NotificationTransport>
            });

        let outlook_relay: Option<Arc<dyn NotificationTransport>> =
            config.outlook.as_ref().map(|credentials| {
                Arc::new(OutlookRelayTransport::new(
                    &config.relay_base_url,
                    credentials.clone(),
                )) as Arc<dyn NotificationTransport>
            });

        Self {
            hosted_api,
            gmail_relay,
            outlook_relay,
        }
    }

    /// プロバイダータグに対応するトランスポートを返す
    fn for_provider(&self, provider: EmailProvider) -> Option<&Arc<dyn NotificationTransport>> {
        match provider {
            EmailProvider::HostedApi => self.hosted_api.as_ref(),
            EmailProvider::GmailRelay => self.gmail_relay.as_ref(),
            EmailProvider::OutlookRelay => self.outlook_relay.as_ref(),
        }
    }
}

/// 通知ディスパッチャ
///
/// 依頼操作の後処理としてメール通知を送る。送信の成否は依頼操作の
/// 結果に影響しない。
pub struct NotificationDispatcher {
    settings_repo: Arc<dyn NotificationSettingsRepository>,
    renderer: TemplateRenderer,
    provider: EmailProvider,
    transports: ProviderTransports,
}

impl NotificationDispatcher {
    pub fn new(
        settings_repo: Arc<dyn NotificationSettingsRepository>,
        renderer: TemplateRenderer,
        provider: EmailProvider,
        transports: ProviderTransports,
    ) -> Self {
        Self {
            settings_repo,
            renderer,
            provider,
            transports,
        }
    }

    /// 通知をバックグラウンドタスクとして送信する（fire-and-forget）
    ///
    /// 起動したタスクの結果を呼び出し元が観測する手段は意図的に用意しない。
    /// 送信は at-most-once で、失敗しても再送しない。
    pub fn dispatch(self: Arc<Self>, request: DamageRequest, kind: NotificationKind) {
        tokio::spawn(async move {
            self.notify(&request, kind).await;
        });
    }

    /// 通知を送信する
    ///
    /// 設定判定 → プロバイダー選択 → レンダリング → 送信を行う。
    /// いずれのステップで失敗してもエラーを返さない（ログ出力のみ）。
    pub async fn notify(&self, request: &DamageRequest, kind: NotificationKind) {
        let kind_str: &str = kind.into();

        // 1. 通知設定を読み込む（未保存・読込失敗・フラグ無効なら何もしない）
        let settings = match self.settings_repo.find().await {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                tracing::debug!(kind = kind_str, "通知設定が未保存のため送信しない");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, kind = kind_str, "通知設定の読み込みに失敗");
                return;
            }
        };

        if !settings.is_enabled(kind) {
            tracing::debug!(kind = kind_str, "通知種別が無効のため送信しない");
            return;
        }

        // 2. プロバイダータグで経路を選択（資格情報未設定なら黙ってスキップ）
        let Some(transport) = self.transports.for_provider(self.provider) else {
            tracing::debug!(
                provider = %self.provider,
                kind = kind_str,
                "プロバイダーの資格情報が未設定のため通知をスキップ"
            );
            return;
        };

        // 3. 宛先とメール本文を組み立てる
        let recipients = settings.email_recipients();

        let email = match self.renderer.render(self.provider, kind, request) {
            Ok(email) => email,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    kind = kind_str,
                    "通知テンプレートのレンダリングに失敗"
                );
                return;
            }
        };

        // 4. 送信（成功・失敗どちらもビジネスイベントとして記録）
        match transport.send(&recipients, &email).await {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.entity_type = event::entity_type::DAMAGE_REQUEST,
                    event.entity_id = %request.id(),
                    event.result = event::result::SUCCESS,
                    notification.kind = kind_str,
                    notification.provider = %self.provider,
                    "通知メール送信成功"
                );
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.entity_type = event::entity_type::DAMAGE_REQUEST,
                    event.entity_id = %request.id(),
                    event.result = event::result::FAILURE,
                    notification.kind = kind_str,
                    notification.provider = %self.provider,
                    error = %e,
                    "通知メール送信失敗"
                );
            }
        };
    }
}
