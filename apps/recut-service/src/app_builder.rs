//! # アプリケーション構築
//!
//! ルーター構築とレイヤー適用を担当する。`main.rs` はインフラ初期化と
//! サーバー起動に集中し、テストはここで構築したルーターをそのまま
//! `tower::ServiceExt::oneshot` で駆動する。

use std::sync::Arc;

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post, put},
};
use recut_infra::repository::DamageRequestRepository;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handler::{
    DamageRequestState,
    SendEmailState,
    create_damage_request,
    delete_damage_request,
    get_damage_request,
    health_check,
    list_damage_requests,
    send_email,
    update_damage_request_status,
};

/// ルーターを構築する
///
/// CORS は許可オリジン `*` のパーミッシブ設定。`OPTIONS` プリフライトには
/// `CorsLayer` が 200 で応答し、`Access-Control-Allow-Origin` /
/// `-Methods` / `-Headers` の 3 ヘッダーを付与する。
pub fn build_app<R>(
    damage_request_state: Arc<DamageRequestState<R>>,
    send_email_state: Arc<SendEmailState>,
) -> Router
where
    R: DamageRequestRepository + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        // リカット依頼 API
        .route(
            "/api/damage-requests",
            get(list_damage_requests::<R>).post(create_damage_request::<R>),
        )
        .route(
            "/api/damage-requests/{id}",
            get(get_damage_request::<R>).delete(delete_damage_request::<R>),
        )
        .route(
            "/api/damage-requests/{id}/status",
            put(update_damage_request_status::<R>),
        )
        .with_state(damage_request_state)
        // ホスト API 互換のメール送信エンドポイント
        .route("/api/send-email", post(send_email))
        .with_state(send_email_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
