//! # `/api/send-email` エンドポイントのテスト
//!
//! ホスト API 互換エンドポイントのワイヤー契約を検証する:
//!
//! - CORS プリフライト（`OPTIONS` → 200 + 3 ヘッダー）
//! - 必須フィールド欠落 → 400 と固定のエラーメッセージ
//! - POST / OPTIONS 以外のメソッド → 405
//! - 送信成功 → 200 `{success, messageId, message}`
//! - 送信失敗 → 500 `{error, details}`

use std::sync::Arc;

use axum::{Router, body::Body};
use http::{Method, Request, StatusCode, header};
use recut_domain::notification::EmailProvider;
use recut_infra::{
    mock::{
        MockDamageRequestRepository,
        MockNotificationSettingsRepository,
        MockNotificationTransport,
    },
    notification::HostedApiSender,
};
use recut_service::{
    app_builder::build_app,
    handler::{DamageRequestState, SendEmailState},
    usecase::{
        DamageRequestUseCaseImpl,
        NotificationDispatcher,
        ProviderTransports,
        TemplateRenderer,
    },
};
use tower::ServiceExt;

/// モックトランスポートを差したアプリを構築する
///
/// `mailer` を `None` にすると API キー未設定の状態を再現できる。
fn test_app(mailer: Option<&MockNotificationTransport>) -> Router {
    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::new(MockNotificationSettingsRepository::new()),
        TemplateRenderer::new("Aqua Dynamics".to_string()).unwrap(),
        EmailProvider::HostedApi,
        ProviderTransports {
            hosted_api:    None,
            gmail_relay:   None,
            outlook_relay: None,
        },
    ));
    let damage_request_state = Arc::new(DamageRequestState {
        usecase: DamageRequestUseCaseImpl::new(MockDamageRequestRepository::new(), dispatcher),
    });
    let send_email_state = Arc::new(SendEmailState {
        renderer: TemplateRenderer::new("Aqua Dynamics".to_string()).unwrap(),
        mailer:   mailer.map(|t| Arc::new(t.clone()) as Arc<dyn HostedApiSender>),
    });

    build_app(damage_request_state, send_email_state)
}

fn send_email_body() -> serde_json::Value {
    serde_json::json!({
        "to": ["prod@example.com"],
        "cc": "office@example.com",
        "damageRequest": {
            "gliderName": "Falcon",
            "orderNumber": "ORD-42",
            "reason": "tear",
            "panels": [
                {"panelNumber": "3B", "material": "Dacron", "quantity": 2, "side": "Left"}
            ]
        },
        "type": "new_request"
    })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn optionsプリフライトに200とcorsヘッダー3つで応答する() {
    let app = test_app(None);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/send-email")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap()
            .to_str()
            .unwrap(),
        "*"
    );
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_HEADERS));

    // プリフライトにボディはない
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn toが欠けた場合は400と固定メッセージを返す() {
    let app = test_app(None);

    let mut body = send_email_body();
    body.as_object_mut().unwrap().remove("to");

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/send-email")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json,
        serde_json::json!({ "error": "Missing required fields: to, damageRequest" })
    );
}

#[tokio::test]
async fn damage_requestが欠けた場合も400と同じメッセージを返す() {
    let app = test_app(None);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/send-email")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"to": ["prod@example.com"]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["error"],
        "Missing required fields: to, damageRequest"
    );
}

#[tokio::test]
async fn postとoptions以外のメソッドは405になる() {
    let app = test_app(None);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/send-email")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn 送信成功時は200とメッセージidを返す() {
    let transport = MockNotificationTransport::new();
    let app = test_app(Some(&transport));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/send-email")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(send_email_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["messageId"], "mock-message-id");
    assert_eq!(json["message"], "Email sent successfully");

    // スカラーの cc は配列に正規化されてトランスポートへ渡る
    let sent = transport.sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.to, vec!["prod@example.com".to_string()]);
    assert_eq!(sent[0].0.cc, vec!["office@example.com".to_string()]);
    assert_eq!(
        sent[0].1.subject,
        "New Damage Recut Request - Falcon (ORD-42)"
    );
    assert!(sent[0].1.text_body.contains("Panel: 3B"));
    assert!(sent[0].1.text_body.contains("Material: Dacron"));
}

#[tokio::test]
async fn completion種別の件名が正しい() {
    let transport = MockNotificationTransport::new();
    let app = test_app(Some(&transport));

    let mut body = send_email_body();
    body["type"] = serde_json::json!("completion");

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/send-email")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sent = transport.sent_emails();
    assert_eq!(sent[0].1.subject, "Damage Recut Completed - Falcon (ORD-42)");
}

#[tokio::test]
async fn 未知のtypeでも送信され汎用の件名になる() {
    let transport = MockNotificationTransport::new();
    let app = test_app(Some(&transport));

    let mut body = send_email_body();
    body["type"] = serde_json::json!("unknown_type");

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/send-email")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sent = transport.sent_emails();
    assert_eq!(
        sent[0].1.subject,
        "Damage Recut Notification - Falcon (ORD-42)"
    );
}

#[tokio::test]
async fn 送信失敗時は500とエラー詳細を返す() {
    let transport = MockNotificationTransport::new();
    transport.set_fail(true);
    let app = test_app(Some(&transport));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/send-email")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(send_email_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Failed to send email");
    assert!(json["details"].as_str().unwrap().contains("送信失敗"));
}

#[tokio::test]
async fn apiキー未設定の場合は500を返す() {
    let app = test_app(None);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/send-email")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(send_email_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Failed to send email");
}
