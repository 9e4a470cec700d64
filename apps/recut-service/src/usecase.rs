//! # ユースケース層
//!
//! Recut Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリはジェネリクス、ディスパッチャは `Arc` で注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//! - **書き込み → 通知の順序**: 通知はデータストアへの書き込みが成功した後に
//!   fire-and-forget で送る。通知の成否は操作結果に影響しない
//!
//! ## モジュール構成
//!
//! - `damage_request`: リカット依頼の CRUD とステータス更新
//! - `notification`: テンプレートレンダリングとディスパッチャ

pub mod damage_request;
pub mod notification;

pub use damage_request::{CreateDamageRequestInput, DamageRequestUseCaseImpl};
pub use notification::{NotificationDispatcher, ProviderTransports, TemplateRenderer};
