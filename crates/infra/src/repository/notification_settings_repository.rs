//! # NotificationSettingsRepository
//!
//! 通知設定の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **単一行テーブル**: 設定は 1 行のみ（`id = 1` の固定キー）
//! - **毎回読み直し**: ディスパッチャは送信のたびに `find()` を呼ぶ。
//!   キャッシュは持たない

use async_trait::async_trait;
use chrono::Utc;
use recut_domain::notification::NotificationSettings;
use sqlx::PgPool;

use crate::error::InfraError;

/// 通知設定リポジトリトレイト
#[async_trait]
pub trait NotificationSettingsRepository: Send + Sync {
   /// 通知設定を取得する
   ///
   /// # 戻り値
   ///
   /// - `Ok(Some(settings))`: 設定が保存されている場合
   /// - `Ok(None)`: 設定が未保存の場合（通知は送信されない）
   /// - `Err(_)`: データベースエラー
   async fn find(&self) -> Result<Option<NotificationSettings>, InfraError>;

   /// 通知設定を保存する（upsert）
   async fn save(&self, settings: &NotificationSettings) -> Result<(), InfraError>;
}

/// notification_settings テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct NotificationSettingsRow {
   recipients: Vec<String>,
   cc_recipients: Vec<String>,
   notify_on_new_request: bool,
   notify_on_status_update: bool,
}

impl From<NotificationSettingsRow> for NotificationSettings {
   fn from(row: NotificationSettingsRow) -> Self {
      Self {
         recipients:              row.recipients,
         cc_recipients:           row.cc_recipients,
         notify_on_new_request:   row.notify_on_new_request,
         notify_on_status_update: row.notify_on_status_update,
      }
   }
}

/// PostgreSQL 実装の NotificationSettingsRepository
#[derive(Debug, Clone)]
pub struct PostgresNotificationSettingsRepository {
   pool: PgPool,
}

impl PostgresNotificationSettingsRepository {
   /// 新しいリポジトリインスタンスを作成
   pub fn new(pool: PgPool) -> Self {
      Self { pool }
   }
}

#[async_trait]
impl NotificationSettingsRepository for PostgresNotificationSettingsRepository {
   #[tracing::instrument(skip_all, level = "debug")]
   async fn find(&self) -> Result<Option<NotificationSettings>, InfraError> {
      let row: Option<NotificationSettingsRow> = sqlx::query_as(
         r#"
            SELECT recipients, cc_recipients,
                   notify_on_new_request, notify_on_status_update
            FROM notification_settings
            WHERE id = 1
            "#,
      )
      .fetch_optional(&self.pool)
      .await?;

      Ok(row.map(NotificationSettings::from))
   }

   #[tracing::instrument(skip_all, level = "debug")]
   async fn save(&self, settings: &NotificationSettings) -> Result<(), InfraError> {
      sqlx::query(
         r#"
            INSERT INTO notification_settings (
                id, recipients, cc_recipients,
                notify_on_new_request, notify_on_status_update, updated_at
            )
            VALUES (1, $1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                recipients = EXCLUDED.recipients,
                cc_recipients = EXCLUDED.cc_recipients,
                notify_on_new_request = EXCLUDED.notify_on_new_request,
                notify_on_status_update = EXCLUDED.notify_on_status_update,
                updated_at = EXCLUDED.updated_at
            "#,
      )
      .bind(&settings.recipients)
      .bind(&settings.cc_recipients)
      .bind(settings.notify_on_new_request)
      .bind(settings.notify_on_status_update)
      .bind(Utc::now())
      .execute(&self.pool)
      .await?;

      Ok(())
   }
}
