//! # DamageRequestRepository
//!
//! リカット依頼の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **命名規約の変換**: テーブルは snake_case カラム、ドメインモデルは
//!   Rust の命名。読み出し経路の変換は全フィールドを欠落なく写す
//! - **パネルは JSONB**: `panels` カラムに UI の命名（camelCase）のまま保存
//! - **NULL の正規化**: `requested_by` の NULL は空文字列として読み出す

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recut_domain::damage_request::{
   DamageRequest,
   DamageRequestId,
   DamageRequestRecord,
   PanelInfo,
   RequestStatus,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// リカット依頼リポジトリトレイト
///
/// リカット依頼の永続化操作を定義する。
#[async_trait]
pub trait DamageRequestRepository: Send + Sync {
   /// 依頼を新規保存する
   async fn insert(&self, request: &DamageRequest) -> Result<(), InfraError>;

   /// ID で依頼を取得する
   ///
   /// # 戻り値
   ///
   /// - `Ok(Some(request))`: 依頼が見つかった場合
   /// - `Ok(None)`: 依頼が見つからない場合
   /// - `Err(_)`: データベースエラー
   async fn find_by_id(&self, id: &DamageRequestId) -> Result<Option<DamageRequest>, InfraError>;

   /// 依頼一覧を取得する（作成日時の降順）
   async fn find_all(&self) -> Result<Vec<DamageRequest>, InfraError>;

   /// 依頼のステータスを更新する
   ///
   /// 該当行が存在しない場合も成功として扱う（データストアの結果に従う）。
   async fn update_status(
      &self,
      id: &DamageRequestId,
      status: RequestStatus,
      updated_at: DateTime<Utc>,
   ) -> Result<(), InfraError>;

   /// 依頼を削除する
   async fn delete(&self, id: &DamageRequestId) -> Result<(), InfraError>;
}

/// damage_requests テーブルの行
///
/// カラム名は snake_case。`panels` は JSONB、`requested_by` は NULL 許容。
#[derive(Debug, sqlx::FromRow)]
struct DamageRequestRow {
   id: Uuid,
   glider_name: String,
   order_number: String,
   reason: String,
   requested_by: Option<String>,
   panels: serde_json::Value,
   status: String,
   notes: Option<String>,
   submitted_at: DateTime<Utc>,
   updated_at: DateTime<Utc>,
}

impl DamageRequestRow {
   /// 行をドメインモデルに変換する
   ///
   /// 読み出した全フィールドを欠落なく写す。`requested_by` の NULL は
   /// 空文字列に正規化する。ステータス文字列が不正な場合はエラー。
   fn into_domain(self) -> Result<DamageRequest, InfraError> {
      let panels: Vec<PanelInfo> = serde_json::from_value(self.panels)?;
      let status: RequestStatus = self
         .status
         .parse()
         .map_err(|_| InfraError::invalid_data(format!("不正なステータス: {}", self.status)))?;

      Ok(DamageRequest::from_record(DamageRequestRecord {
         id: DamageRequestId::from_uuid(self.id),
         glider_name: self.glider_name,
         order_number: self.order_number,
         reason: self.reason,
         requested_by: self.requested_by.unwrap_or_default(),
         panels,
         status,
         submitted_at: self.submitted_at,
         updated_at: self.updated_at,
         notes: self.notes,
      }))
   }
}

/// PostgreSQL 実装の DamageRequestRepository
#[derive(Debug, Clone)]
pub struct PostgresDamageRequestRepository {
   pool: PgPool,
}

impl PostgresDamageRequestRepository {
   /// 新しいリポジトリインスタンスを作成
   pub fn new(pool: PgPool) -> Self {
      Self { pool }
   }
}

#[async_trait]
impl DamageRequestRepository for PostgresDamageRequestRepository {
   #[tracing::instrument(skip_all, level = "debug")]
   async fn insert(&self, request: &DamageRequest) -> Result<(), InfraError> {
      let panels = serde_json::to_value(request.panels())?;
      // requested_by は空文字列を NULL として保存する（読み出し時に再び "" に正規化）
      let requested_by = (!request.requested_by().is_empty()).then(|| request.requested_by());

      sqlx::query(
         r#"
            INSERT INTO damage_requests (
                id, glider_name, order_number, reason, requested_by,
                panels, status, notes,
                submitted_at, updated_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
      )
      .bind(request.id().as_uuid())
      .bind(request.glider_name())
      .bind(request.order_number())
      .bind(request.reason())
      .bind(requested_by)
      .bind(panels)
      .bind(request.status().to_string())
      .bind(request.notes())
      .bind(request.submitted_at())
      .bind(request.updated_at())
      .bind(request.submitted_at())
      .execute(&self.pool)
      .await?;

      Ok(())
   }

   #[tracing::instrument(skip_all, level = "debug")]
   async fn find_by_id(&self, id: &DamageRequestId) -> Result<Option<DamageRequest>, InfraError> {
      let row: Option<DamageRequestRow> = sqlx::query_as(
         r#"
            SELECT id, glider_name, order_number, reason, requested_by,
                   panels, status, notes, submitted_at, updated_at
            FROM damage_requests
            WHERE id = $1
            "#,
      )
      .bind(id.as_uuid())
      .fetch_optional(&self.pool)
      .await?;

      row.map(DamageRequestRow::into_domain).transpose()
   }

   #[tracing::instrument(skip_all, level = "debug")]
   async fn find_all(&self) -> Result<Vec<DamageRequest>, InfraError> {
      let rows: Vec<DamageRequestRow> = sqlx::query_as(
         r#"
            SELECT id, glider_name, order_number, reason, requested_by,
                   panels, status, notes, submitted_at, updated_at
            FROM damage_requests
            ORDER BY created_at DESC
            "#,
      )
      .fetch_all(&self.pool)
      .await?;

      rows.into_iter()
         .map(DamageRequestRow::into_domain)
         .collect()
   }

   #[tracing::instrument(skip_all, level = "debug")]
   async fn update_status(
      &self,
      id: &DamageRequestId,
      status: RequestStatus,
      updated_at: DateTime<Utc>,
   ) -> Result<(), InfraError> {
      sqlx::query(
         r#"
            UPDATE damage_requests
            SET status = $2, updated_at = $3
            WHERE id = $1
            "#,
      )
      .bind(id.as_uuid())
      .bind(status.to_string())
      .bind(updated_at)
      .execute(&self.pool)
      .await?;

      Ok(())
   }

   #[tracing::instrument(skip_all, level = "debug")]
   async fn delete(&self, id: &DamageRequestId) -> Result<(), InfraError> {
      sqlx::query("DELETE FROM damage_requests WHERE id = $1")
         .bind(id.as_uuid())
         .execute(&self.pool)
         .await?;

      Ok(())
   }
}
