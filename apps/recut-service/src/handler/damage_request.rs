//! # リカット依頼 API ハンドラ
//!
//! リカット依頼の CRUD エンドポイントを実装する。
//!
//! ## エンドポイント
//!
//! | メソッド | パス | 処理 |
//! |---------|------|------|
//! | GET | `/api/damage-requests` | 一覧取得（新しい順） |
//! | POST | `/api/damage-requests` | 作成（201） |
//! | GET | `/api/damage-requests/{id}` | 取得（存在しない場合 404） |
//! | DELETE | `/api/damage-requests/{id}` | 削除 |
//! | PUT | `/api/damage-requests/{id}/status` | ステータス更新 |

use std::sync::Arc;

use axum::{
   Json,
   extract::{Path, State},
   http::StatusCode,
   response::{IntoResponse, Response},
};
use recut_domain::damage_request::{DamageRequest, DamageRequestId, PanelInfo, RequestStatus};
use recut_infra::repository::DamageRequestRepository;
use recut_shared::ApiResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
   error::ServiceError,
   usecase::{CreateDamageRequestInput, DamageRequestUseCaseImpl},
};

/// リカット依頼ハンドラーの State
pub struct DamageRequestState<R> {
   pub usecase: DamageRequestUseCaseImpl<R>,
}

/// リカット依頼 DTO
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageRequestDto {
   pub id:           String,
   pub glider_name:  String,
   pub order_number: String,
   pub reason:       String,
   pub requested_by: String,
   pub panels:       Vec<PanelInfo>,
   pub status:       RequestStatus,
   pub submitted_at: String,
   pub updated_at:   String,
   #[serde(skip_serializing_if = "Option::is_none")]
   pub notes:        Option<String>,
}

impl DamageRequestDto {
   fn from_domain(request: &DamageRequest) -> Self {
      Self {
         id:           request.id().to_string(),
         glider_name:  request.glider_name().to_string(),
         order_number: request.order_number().to_string(),
         reason:       request.reason().to_string(),
         requested_by: request.requested_by().to_string(),
         panels:       request.panels().to_vec(),
         status:       request.status(),
         submitted_at: request.submitted_at().to_rfc3339(),
         updated_at:   request.updated_at().to_rfc3339(),
         notes:        request.notes().map(str::to_string),
      }
   }
}

/// リカット依頼作成リクエスト
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDamageRequestDto {
   pub glider_name:  String,
   pub order_number: String,
   pub reason:       String,
   #[serde(default)]
   pub requested_by: String,
   pub panels:       Vec<PanelInfo>,
   #[serde(default)]
   pub notes:        Option<String>,
   #[serde(default)]
   pub status:       Option<RequestStatus>,
}

/// ステータス更新リクエスト
#[derive(Debug, Deserialize)]
pub struct UpdateStatusDto {
   pub status: RequestStatus,
}

/// リカット依頼を作成する
///
/// ## エンドポイント
/// POST /api/damage-requests
pub async fn create_damage_request<R>(
   State(state): State<Arc<DamageRequestState<R>>>,
   Json(dto): Json<CreateDamageRequestDto>,
) -> Result<Response, ServiceError>
where
   R: DamageRequestRepository,
{
   let request = state
      .usecase
      .create_damage_request(CreateDamageRequestInput {
         glider_name:  dto.glider_name,
         order_number: dto.order_number,
         reason:       dto.reason,
         requested_by: dto.requested_by,
         panels:       dto.panels,
         notes:        dto.notes,
         status:       dto.status,
      })
      .await?;

   let response = ApiResponse::new(DamageRequestDto::from_domain(&request));
   Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// リカット依頼の一覧を取得する
///
/// ## エンドポイント
/// GET /api/damage-requests
pub async fn list_damage_requests<R>(
   State(state): State<Arc<DamageRequestState<R>>>,
) -> Result<Response, ServiceError>
where
   R: DamageRequestRepository,
{
   let requests = state.usecase.list_damage_requests().await?;

   let response = ApiResponse::new(
      requests
         .iter()
         .map(DamageRequestDto::from_domain)
         .collect::<Vec<_>>(),
   );
   Ok((StatusCode::OK, Json(response)).into_response())
}

/// リカット依頼を取得する
///
/// ## エンドポイント
/// GET /api/damage-requests/{id}
pub async fn get_damage_request<R>(
   State(state): State<Arc<DamageRequestState<R>>>,
   Path(id): Path<Uuid>,
) -> Result<Response, ServiceError>
where
   R: DamageRequestRepository,
{
   let request = state
      .usecase
      .get_damage_request(DamageRequestId::from_uuid(id))
      .await?
      .ok_or_else(|| ServiceError::NotFound(format!("リカット依頼が見つかりません: {id}")))?;

   let response = ApiResponse::new(DamageRequestDto::from_domain(&request));
   Ok((StatusCode::OK, Json(response)).into_response())
}

/// リカット依頼のステータスを更新する
///
/// ## エンドポイント
/// PUT /api/damage-requests/{id}/status
pub async fn update_damage_request_status<R>(
   State(state): State<Arc<DamageRequestState<R>>>,
   Path(id): Path<Uuid>,
   Json(dto): Json<UpdateStatusDto>,
) -> Result<Response, ServiceError>
where
   R: DamageRequestRepository,
{
   state
      .usecase
      .update_damage_request_status(DamageRequestId::from_uuid(id), dto.status)
      .await?;

   Ok(StatusCode::NO_CONTENT.into_response())
}

/// リカット依頼を削除する
///
/// ## エンドポイント
/// DELETE /api/damage-requests/{id}
pub async fn delete_damage_request<R>(
   State(state): State<Arc<DamageRequestState<R>>>,
   Path(id): Path<Uuid>,
) -> Result<Response, ServiceError>
where
   R: DamageRequestRepository,
{
   state
      .usecase
      .delete_damage_request(DamageRequestId::from_uuid(id))
      .await?;

   Ok(StatusCode::NO_CONTENT.into_response())
}
