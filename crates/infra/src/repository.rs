//! # リポジトリ実装
//!
//! リカット依頼と通知設定の永続化を担当するリポジトリ実装を提供する。
//!
//! ## 設計方針
//!
//! - **依存性逆転**: ユースケース層はトレイト経由でリポジトリを使用
//! - **データベース抽象化**: sqlx を使用し、PostgreSQL 固有の処理をカプセル化
//! - **テスタビリティ**: トレイト経由でモック可能な設計

pub mod damage_request_repository;
pub mod notification_settings_repository;

pub use damage_request_repository::{DamageRequestRepository, PostgresDamageRequestRepository};
pub use notification_settings_repository::{
   NotificationSettingsRepository,
   PostgresNotificationSettingsRepository,
};
