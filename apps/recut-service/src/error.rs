//! # Recut Service エラー定義
//!
//! Recut Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! 永続化エラーだけがユーザー操作を中断できる。通知まわりの失敗は
//! ディスパッチャの内側で握りつぶされ、この型には決して現れない。

use axum::{
   Json,
   http::StatusCode,
   response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// エラーレスポンス（RFC 7807 Problem Details）
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
   #[serde(rename = "type")]
   pub error_type: String,
   pub title:      String,
   pub status:     u16,
   pub detail:     String,
}

/// Recut Service で発生するエラー
#[derive(Debug, Error)]
pub enum ServiceError {
   /// リソースが見つからない
   #[error("リソースが見つかりません: {0}")]
   NotFound(String),

   /// 不正なリクエスト
   #[error("不正なリクエスト: {0}")]
   BadRequest(String),

   /// データベースエラー
   #[error("データベースエラー: {0}")]
   Database(#[from] recut_infra::InfraError),

   /// 内部エラー
   #[error("内部エラー: {0}")]
   Internal(String),
}

impl IntoResponse for ServiceError {
   fn into_response(self) -> Response {
      let (status, error_type, title, detail) = match &self {
         ServiceError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            "https://recut.aquadynamics.example.com/errors/not-found",
            "Not Found",
            msg.clone(),
         ),
         ServiceError::BadRequest(msg) => (
            StatusCode::BAD_REQUEST,
            "https://recut.aquadynamics.example.com/errors/bad-request",
            "Bad Request",
            msg.clone(),
         ),
         ServiceError::Database(e) => {
            tracing::error!("データベースエラー: {}", e);
            (
               StatusCode::INTERNAL_SERVER_ERROR,
               "https://recut.aquadynamics.example.com/errors/internal-error",
               "Internal Server Error",
               "内部エラーが発生しました".to_string(),
            )
         }
         ServiceError::Internal(msg) => {
            tracing::error!("内部エラー: {}", msg);
            (
               StatusCode::INTERNAL_SERVER_ERROR,
               "https://recut.aquadynamics.example.com/errors/internal-error",
               "Internal Server Error",
               "内部エラーが発生しました".to_string(),
            )
         }
      };

      (
         status,
         Json(ErrorResponse {
            error_type: error_type.to_string(),
            title: title.to_string(),
            status: status.as_u16(),
            detail,
         }),
      )
         .into_response()
   }
}
