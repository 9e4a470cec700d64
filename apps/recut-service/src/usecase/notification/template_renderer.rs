//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで通知メールを HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **プロバイダーごとのスタイル**: 3 プロバイダーは見た目の異なるテンプレートを
//!   持つが、論理的な情報量は同一。レンダラーは 1 つで、スタイル引数で切り替える
//! - **純関数**: 依頼・通知種別・スタイルだけから `EmailContent` を生成する。
//!   I/O は行わない
//!
//! ## 件名の形式
//!
//! | スタイル | 種別 | 件名 |
//! |---------|------|------|
//! | ホスト API | 新規依頼 | `New Damage Recut Request - {機体} ({受注番号})` |
//! | ホスト API | ステータス更新 | `Status Update - {機体} ({受注番号}) - {ステータス}` |
//! | ホスト API | 完了 | `Damage Recut Completed - {機体} ({受注番号})` |
//! | Gmail/Outlook | 新規依頼 | `Panel Recut Request: {機体} ({受注番号})` |
//! | Gmail/Outlook | ステータス更新 | `Status Update: {機体} - {ステータス} ({受注番号})` |

use recut_domain::{
    damage_request::{DamageRequest, PanelInfo, RequestStatus},
    notification::{EmailContent, EmailProvider, NotificationError, NotificationKind},
};
use serde::Serialize;
use tera::{Context, Tera};

/// テンプレートに渡すパネル情報
///
/// Gmail / Outlook スタイルでは `panel_type` の冗長な `"General "`
/// プレフィックスを除去した値が入る。
#[derive(Debug, Serialize)]
struct PanelView {
    panel_number: String,
    panel_type:   String,
    material:     String,
    side:         String,
    quantity:     u32,
}

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、`DamageRequest` と通知種別から
/// `EmailContent` を生成する。
pub struct TemplateRenderer {
    engine:       Tera,
    company_name: String,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new(company_name: String) -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "hosted_api_new_request.html",
                    include_str!("../../../templates/notifications/hosted_api_new_request.html"),
                ),
                (
                    "hosted_api_new_request.txt",
                    include_str!("../../../templates/notifications/hosted_api_new_request.txt"),
                ),
                (
                    "hosted_api_status_update.html",
                    include_str!("../../../templates/notifications/hosted_api_status_update.html"),
                ),
                (
                    "hosted_api_status_update.txt",
                    include_str!("../../../templates/notifications/hosted_api_status_update.txt"),
                ),
                (
                    "gmail_new_request.html",
                    include_str!("../../../templates/notifications/gmail_new_request.html"),
                ),
                (
                    "gmail_new_request.txt",
                    include_str!("../../../templates/notifications/gmail_new_request.txt"),
                ),
                (
                    "gmail_status_update.html",
                    include_str!("../../../templates/notifications/gmail_status_update.html"),
                ),
                (
                    "gmail_status_update.txt",
                    include_str!("../../../templates/notifications/gmail_status_update.txt"),
                ),
                (
                    "outlook_new_request.html",
                    include_str!("../../../templates/notifications/outlook_new_request.html"),
                ),
                (
                    "outlook_new_request.txt",
                    include_str!("../../../templates/notifications/outlook_new_request.txt"),
                ),
                (
                    "outlook_status_update.html",
                    include_str!("../../../templates/notifications/outlook_status_update.html"),
                ),
                (
                    "outlook_status_update.txt",
                    include_str!("../../../templates/notifications/outlook_status_update.txt"),
                ),
            ])
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self {
            engine,
            company_name,
        })
    }

    /// 依頼と通知種別からメール本文を生成する
    ///
    /// # 引数
    ///
    /// - `style`: プロバイダーごとの見た目（テンプレートセット）の選択
    /// - `kind`: 通知イベント種別
    /// - `request`: リカット依頼
    pub fn render(
        &self,
        style: EmailProvider,
        kind: NotificationKind,
        request: &DamageRequest,
    ) -> Result<EmailContent, NotificationError> {
        let subject = self.build_subject(style, kind, request);
        self.render_with_subject(style, kind, request, subject)
    }

    /// 種別が不明な場合の本文を生成する（ホスト API エンドポイント用）
    ///
    /// 新規依頼のレイアウトに汎用の件名を組み合わせる。
    pub fn render_hosted_fallback(
        &self,
        request: &DamageRequest,
    ) -> Result<EmailContent, NotificationError> {
        let subject = format!(
            "Damage Recut Notification - {} ({})",
            request.glider_name(),
            request.order_number()
        );
        self.render_with_subject(
            EmailProvider::HostedApi,
            NotificationKind::NewRequest,
            request,
            subject,
        )
    }

    fn render_with_subject(
        &self,
        style: EmailProvider,
        kind: NotificationKind,
        request: &DamageRequest,
        subject: String,
    ) -> Result<EmailContent, NotificationError> {
        let template_base = template_base(style, kind);
        let context = self.build_context(style, request);

        let html_body = self
            .engine
            .render(&format!("{template_base}.html"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        let text_body = self
            .engine
            .render(&format!("{template_base}.txt"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(EmailContent {
            subject,
            html_body,
            text_body,
        })
    }

    /// 件名を構築する
    fn build_subject(
        &self,
        style: EmailProvider,
        kind: NotificationKind,
        request: &DamageRequest,
    ) -> String {
        let glider_name = request.glider_name();
        let order_number = request.order_number();
        let status = request.status();

        match (style, kind) {
            (EmailProvider::HostedApi, NotificationKind::NewRequest) => {
                format!("New Damage Recut Request - {glider_name} ({order_number})")
            }
            (EmailProvider::HostedApi, NotificationKind::StatusUpdate) => {
                format!("Status Update - {glider_name} ({order_number}) - {status}")
            }
            (EmailProvider::HostedApi, NotificationKind::Completion) => {
                format!("Damage Recut Completed - {glider_name} ({order_number})")
            }
            (
                EmailProvider::GmailRelay | EmailProvider::OutlookRelay,
                NotificationKind::NewRequest,
            ) => {
                format!("Panel Recut Request: {glider_name} ({order_number})")
            }
            (
                EmailProvider::GmailRelay | EmailProvider::OutlookRelay,
                NotificationKind::StatusUpdate | NotificationKind::Completion,
            ) => {
                format!("Status Update: {glider_name} - {status} ({order_number})")
            }
        }
    }

    /// テンプレートコンテキストを構築する
    fn build_context(&self, style: EmailProvider, request: &DamageRequest) -> Context {
        let strip_prefix = style != EmailProvider::HostedApi;
        let panels: Vec<PanelView> = request
            .panels()
            .iter()
            .map(|p| to_panel_view(p, strip_prefix))
            .collect();

        let mut context = Context::new();
        context.insert("company_name", &self.company_name);
        context.insert("glider_name", request.glider_name());
        context.insert("order_number", request.order_number());
        context.insert("reason", request.reason());
        context.insert("requested_by", request.requested_by());
        context.insert("status", &request.status().to_string());
        context.insert("status_color", status_color(request.status()));
        context.insert("panels", &panels);
        context.insert(
            "submitted_at",
            &format_timestamp(style, request.submitted_at()),
        );
        context.insert("updated_at", &format_timestamp(style, request.updated_at()));
        // notes が None または空の場合、テンプレート側でセクションごと省略される
        context.insert("notes", &request.notes().unwrap_or(""));

        context
    }
}

/// スタイルと種別からテンプレート名（拡張子抜き）を決定する
///
/// 完了通知は専用レイアウトを持たず、ステータス更新のレイアウトを使う
/// （Gmail / Outlook が完了種別を受け取ることはディスパッチャ上ないが、
/// レンダラーとしては全組み合わせを定義しておく）。
fn template_base(style: EmailProvider, kind: NotificationKind) -> &'static str {
    match (style, kind) {
        (EmailProvider::HostedApi, NotificationKind::NewRequest) => "hosted_api_new_request",
        (EmailProvider::HostedApi, _) => "hosted_api_status_update",
        (EmailProvider::GmailRelay, NotificationKind::NewRequest) => "gmail_new_request",
        (EmailProvider::GmailRelay, _) => "gmail_status_update",
        (EmailProvider::OutlookRelay, NotificationKind::NewRequest) => "outlook_new_request",
        (EmailProvider::OutlookRelay, _) => "outlook_status_update",
    }
}

/// パネル情報をテンプレート用に変換する
///
/// `strip_prefix` が真の場合、`panel_type` 先頭の `"General"`（大文字小文字
/// 不問）とそれに続く空白を除去する。
fn to_panel_view(panel: &PanelInfo, strip_prefix: bool) -> PanelView {
    let panel_type = if strip_prefix {
        strip_general_prefix(&panel.panel_type)
    } else {
        panel.panel_type.clone()
    };

    PanelView {
        panel_number: panel.panel_number.clone(),
        panel_type,
        material: panel.material.clone(),
        side: panel.side.clone(),
        quantity: panel.quantity,
    }
}

/// `panel_type` 先頭の冗長な `"General "` プレフィックスを除去する
fn strip_general_prefix(panel_type: &str) -> String {
    const PREFIX: &str = "General";
    match panel_type.get(..PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PREFIX) => {
            panel_type[PREFIX.len()..].trim_start().to_string()
        }
        _ => panel_type.to_string(),
    }
}

/// ステータスに対応する強調色（ホスト API のステータス更新テンプレート用）
fn status_color(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Done => "#10b981",
        RequestStatus::InProgress => "#f59e0b",
        RequestStatus::Pending => "#6b7280",
    }
}

/// タイムスタンプを人間可読な形式に整形する
///
/// ホスト API スタイルは秒付き、Gmail / Outlook スタイルは
/// 長い月名＋分までの形式。いずれも en-US 表記。
fn format_timestamp(style: EmailProvider, at: chrono::DateTime<chrono::Utc>) -> String {
    match style {
        EmailProvider::HostedApi => at.format("%B %-d, %Y, %-I:%M:%S %p").to_string(),
        EmailProvider::GmailRelay | EmailProvider::OutlookRelay => {
            at.format("%B %-d, %Y, %I:%M %p").to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use recut_domain::damage_request::{DamageRequestId, DamageRequestRecord};

    use super::*;

    fn make_renderer() -> TemplateRenderer {
        TemplateRenderer::new("Aqua Dynamics".to_string()).unwrap()
    }

    fn make_panel() -> PanelInfo {
        PanelInfo {
            panel_number: "3B".to_string(),
            panel_type:   "General Top Surface".to_string(),
            material:     "Dacron".to_string(),
            side:         "Left".to_string(),
            quantity:     2,
        }
    }

    fn make_request() -> DamageRequest {
        let submitted_at = Utc.with_ymd_and_hms(2025, 1, 5, 14, 30, 0).unwrap();
        DamageRequest::from_record(DamageRequestRecord {
            id: DamageRequestId::new(),
            glider_name: "Falcon".to_string(),
            order_number: "ORD-42".to_string(),
            reason: "tear".to_string(),
            requested_by: String::new(),
            panels: vec![make_panel()],
            status: RequestStatus::Pending,
            submitted_at,
            updated_at: submitted_at,
            notes: None,
        })
    }

    #[test]
    fn newが正常に初期化される() {
        let renderer = TemplateRenderer::new("Aqua Dynamics".to_string());
        assert!(renderer.is_ok());
    }

    #[test]
    fn ホストapiの新規依頼の件名と本文が正しい() {
        let renderer = make_renderer();
        let request = make_request();

        let email = renderer
            .render(
                EmailProvider::HostedApi,
                NotificationKind::NewRequest,
                &request,
            )
            .unwrap();

        assert_eq!(email.subject, "New Damage Recut Request - Falcon (ORD-42)");
        assert!(email.text_body.contains("Panel: 3B"));
        assert!(email.text_body.contains("Material: Dacron"));
        assert!(email.text_body.contains("Quantity: 2"));
        assert!(email.text_body.contains("Side: Left"));
        assert!(email.html_body.contains("Falcon"));
        assert!(email.html_body.contains("ORD-42"));
        assert!(email.html_body.contains("Dacron"));
    }

    #[test]
    fn ホストapiのステータス更新の件名にステータスが含まれる() {
        let renderer = make_renderer();
        let request = make_request().with_status(RequestStatus::InProgress, Utc::now());

        let email = renderer
            .render(
                EmailProvider::HostedApi,
                NotificationKind::StatusUpdate,
                &request,
            )
            .unwrap();

        assert_eq!(email.subject, "Status Update - Falcon (ORD-42) - In Progress");
        assert!(email.text_body.contains("Status: In Progress"));
        // In Progress の強調色
        assert!(email.html_body.contains("#f59e0b"));
    }

    #[test]
    fn ホストapiの完了の件名が正しい() {
        let renderer = make_renderer();
        let request = make_request().with_status(RequestStatus::Done, Utc::now());

        let email = renderer
            .render(
                EmailProvider::HostedApi,
                NotificationKind::Completion,
                &request,
            )
            .unwrap();

        assert_eq!(email.subject, "Damage Recut Completed - Falcon (ORD-42)");
    }

    #[test]
    fn gmailの新規依頼の件名と本文が正しい() {
        let renderer = make_renderer();
        let request = make_request();

        let email = renderer
            .render(
                EmailProvider::GmailRelay,
                NotificationKind::NewRequest,
                &request,
            )
            .unwrap();

        assert_eq!(email.subject, "Panel Recut Request: Falcon (ORD-42)");
        // "General " プレフィックスは除去される
        assert!(email.html_body.contains("Top Surface - Panel 3B"));
        assert!(!email.html_body.contains("General Top Surface"));
        assert!(email.text_body.contains("Top Surface Panel 3B"));
    }

    #[test]
    fn gmailのステータス更新の件名が正しい() {
        let renderer = make_renderer();
        let request = make_request().with_status(RequestStatus::Done, Utc::now());

        let email = renderer
            .render(
                EmailProvider::GmailRelay,
                NotificationKind::StatusUpdate,
                &request,
            )
            .unwrap();

        assert_eq!(email.subject, "Status Update: Falcon - Done (ORD-42)");
        assert!(email.text_body.contains("New Status: Done"));
    }

    #[test]
    fn outlookの新規依頼がgmailと同じ情報を別レイアウトで含む() {
        let renderer = make_renderer();
        let request = make_request();

        let email = renderer
            .render(
                EmailProvider::OutlookRelay,
                NotificationKind::NewRequest,
                &request,
            )
            .unwrap();

        assert_eq!(email.subject, "Panel Recut Request: Falcon (ORD-42)");
        assert!(email.html_body.contains("Panel Recut Management System"));
        assert!(email.text_body.contains("Qty: 2"));
    }

    #[test]
    fn requested_byが空の場合ホストapiはnot_specifiedと表示する() {
        let renderer = make_renderer();
        let request = make_request();

        let email = renderer
            .render(
                EmailProvider::HostedApi,
                NotificationKind::NewRequest,
                &request,
            )
            .unwrap();

        assert!(email.text_body.contains("Requested by: Not specified"));
        assert!(email.html_body.contains("Not specified"));
    }

    #[test]
    fn requested_byが空の場合gmailは行ごと省略する() {
        let renderer = make_renderer();
        let request = make_request();

        let email = renderer
            .render(
                EmailProvider::GmailRelay,
                NotificationKind::NewRequest,
                &request,
            )
            .unwrap();

        assert!(!email.html_body.contains("Requested by:"));
        assert!(!email.text_body.contains("Requested by:"));
    }

    #[test]
    fn requested_byがある場合は全スタイルで表示される() {
        let renderer = make_renderer();
        let submitted_at = Utc.with_ymd_and_hms(2025, 1, 5, 14, 30, 0).unwrap();
        let request = DamageRequest::from_record(DamageRequestRecord {
            id: DamageRequestId::new(),
            glider_name: "Falcon".to_string(),
            order_number: "ORD-42".to_string(),
            reason: "tear".to_string(),
            requested_by: "Jane".to_string(),
            panels: vec![make_panel()],
            status: RequestStatus::Pending,
            submitted_at,
            updated_at: submitted_at,
            notes: None,
        });

        for style in [
            EmailProvider::HostedApi,
            EmailProvider::GmailRelay,
            EmailProvider::OutlookRelay,
        ] {
            let email = renderer
                .render(style, NotificationKind::NewRequest, &request)
                .unwrap();
            assert!(
                email.text_body.contains("Requested by: Jane"),
                "{style} の本文に依頼者名が含まれること"
            );
        }
    }

    #[test]
    fn notesなしの場合はセクションごと省略される() {
        let renderer = make_renderer();
        let request = make_request();

        let email = renderer
            .render(
                EmailProvider::HostedApi,
                NotificationKind::NewRequest,
                &request,
            )
            .unwrap();

        assert!(!email.html_body.contains("Additional Notes"));
        assert!(!email.text_body.contains("Additional Notes"));
    }

    #[test]
    fn notesありの場合は本文に含まれる() {
        let renderer = make_renderer();
        let submitted_at = Utc.with_ymd_and_hms(2025, 1, 5, 14, 30, 0).unwrap();
        let request = DamageRequest::from_record(DamageRequestRecord {
            id: DamageRequestId::new(),
            glider_name: "Falcon".to_string(),
            order_number: "ORD-42".to_string(),
            reason: "tear".to_string(),
            requested_by: String::new(),
            panels: vec![make_panel()],
            status: RequestStatus::Pending,
            submitted_at,
            updated_at: submitted_at,
            notes: Some("Rush order".to_string()),
        });

        let email = renderer
            .render(
                EmailProvider::HostedApi,
                NotificationKind::NewRequest,
                &request,
            )
            .unwrap();

        assert!(email.html_body.contains("Additional Notes"));
        assert!(email.html_body.contains("Rush order"));
        assert!(email.text_body.contains("Rush order"));
    }

    #[test]
    fn タイムスタンプが長い形式で整形される() {
        let renderer = make_renderer();
        let request = make_request();

        let hosted = renderer
            .render(
                EmailProvider::HostedApi,
                NotificationKind::NewRequest,
                &request,
            )
            .unwrap();
        assert!(hosted.text_body.contains("January 5, 2025, 2:30:00 PM"));

        let gmail = renderer
            .render(
                EmailProvider::GmailRelay,
                NotificationKind::NewRequest,
                &request,
            )
            .unwrap();
        assert!(gmail.text_body.contains("January 5, 2025, 02:30 PM"));
    }

    #[test]
    fn render_hosted_fallbackが汎用の件名を使う() {
        let renderer = make_renderer();
        let request = make_request();

        let email = renderer.render_hosted_fallback(&request).unwrap();

        assert_eq!(email.subject, "Damage Recut Notification - Falcon (ORD-42)");
        // 本文は新規依頼レイアウト
        assert!(email.text_body.contains("NEW DAMAGE RECUT REQUEST"));
    }

    #[test]
    fn strip_general_prefixの挙動() {
        assert_eq!(strip_general_prefix("General Top Surface"), "Top Surface");
        assert_eq!(strip_general_prefix("general rib"), "rib");
        assert_eq!(strip_general_prefix("Leading Edge"), "Leading Edge");
        assert_eq!(strip_general_prefix(""), "");
    }
}
