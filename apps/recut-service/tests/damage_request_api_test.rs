//! # リカット依頼 API のテスト
//!
//! ルーター経由で CRUD エンドポイントのワイヤー形式（camelCase DTO、
//! `{ "data": ... }` エンベロープ、ステータスコード）を検証する。

use std::sync::Arc;

use axum::{Router, body::Body};
use http::{Method, Request, StatusCode, header};
use recut_domain::notification::{EmailProvider, NotificationSettings};
use recut_infra::mock::{
    MockDamageRequestRepository,
    MockNotificationSettingsRepository,
    MockNotificationTransport,
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

struct TestApp {
    app:       Router,
    repo:      MockDamageRequestRepository,
    transport: MockNotificationTransport,
}

fn test_app() -> TestApp {
    let repo = MockDamageRequestRepository::new();
    let transport = MockNotificationTransport::new();
    let settings_repo = MockNotificationSettingsRepository::new();
    settings_repo.set_settings(NotificationSettings {
        recipients:              vec!["prod@example.com".to_string()],
        cc_recipients:           vec![],
        notify_on_new_request:   true,
        notify_on_status_update: true,
    });

    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::new(settings_repo),
        TemplateRenderer::new("Aqua Dynamics".to_string()).unwrap(),
        EmailProvider::HostedApi,
        ProviderTransports {
            hosted_api:    Some(Arc::new(transport.clone())),
            gmail_relay:   None,
            outlook_relay: None,
        },
    ));
    let damage_request_state = Arc::new(DamageRequestState {
        usecase: DamageRequestUseCaseImpl::new(repo.clone(), dispatcher),
    });
    let send_email_state = Arc::new(SendEmailState {
        renderer: TemplateRenderer::new("Aqua Dynamics".to_string()).unwrap(),
        mailer:   None,
    });

    TestApp {
        app: build_app(damage_request_state, send_email_state),
        repo,
        transport,
    }
}

fn create_body() -> String {
    serde_json::json!({
        "gliderName": "Falcon",
        "orderNumber": "ORD-42",
        "reason": "tear",
        "panels": [
            {"panelNumber": "3B", "material": "Dacron", "quantity": 2, "side": "Left"}
        ]
    })
    .to_string()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// dispatch で起動したバックグラウンドタスクを完了させる
async fn drain_background_tasks() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn createが201とcamel_caseのdtoを返す() {
    let fixture = test_app();

    let response = fixture
        .app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/damage-requests")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(create_body()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["gliderName"], "Falcon");
    assert_eq!(data["orderNumber"], "ORD-42");
    assert_eq!(data["status"], "Pending");
    assert_eq!(data["requestedBy"], "");
    assert_eq!(data["panels"][0]["panelNumber"], "3B");
    // notes は未指定の場合キーごと省略される
    assert!(data.get("notes").is_none());

    assert_eq!(fixture.repo.requests().len(), 1);
}

#[tokio::test]
async fn createで必須フィールドが空の場合は400を返す() {
    let fixture = test_app();

    let body = serde_json::json!({
        "gliderName": "",
        "orderNumber": "ORD-42",
        "reason": "tear",
        "panels": []
    });

    let response = fixture
        .app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/damage-requests")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(fixture.repo.requests().is_empty());
}

#[tokio::test]
async fn getは存在しないidに404を返す() {
    let fixture = test_app();

    let response = fixture
        .app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/api/damage-requests/{}",
                    uuid::Uuid::now_v7()
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn 作成した依頼が一覧と個別取得で返る() {
    let fixture = test_app();

    let create_response = fixture
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/damage-requests")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(create_body()))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = body_json(create_response).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    drain_background_tasks().await;

    // 一覧
    let list_response = fixture
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/damage-requests")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(list_response.status(), StatusCode::OK);
    let list = body_json(list_response).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    // 個別取得で作成時のフィールドが再現される
    let get_response = fixture
        .app
        .oneshot(
            Request::builder()
                .uri(format!("/api/damage-requests/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(get_response.status(), StatusCode::OK);
    let fetched = body_json(get_response).await;
    assert_eq!(fetched["data"]["gliderName"], "Falcon");
    assert_eq!(fetched["data"]["panels"][0]["material"], "Dacron");
    assert_eq!(fetched["data"]["requestedBy"], "");
}

#[tokio::test]
async fn ステータス更新が204を返し通知失敗でも成功する() {
    let fixture = test_app();
    // トランスポートを失敗させても更新操作は成功する
    fixture.transport.set_fail(true);

    let create_response = fixture
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/damage-requests")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(create_body()))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = body_json(create_response).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    drain_background_tasks().await;

    let response = fixture
        .app
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri(format!("/api/damage-requests/{id}/status"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status": "In Progress"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    drain_background_tasks().await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        fixture.repo.requests()[0].status().to_string(),
        "In Progress"
    );
}

#[tokio::test]
async fn deleteが204を返し依頼が消える() {
    let fixture = test_app();

    let create_response = fixture
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/damage-requests")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(create_body()))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = body_json(create_response).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    drain_background_tasks().await;

    let response = fixture
        .app
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/damage-requests/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(fixture.repo.requests().is_empty());
}
