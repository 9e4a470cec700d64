//! # Panel Recut ドメイン層
//!
//! 破損パネル再製作依頼（ダメージリカット依頼）のドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（例: DamageRequest）
//! - **値オブジェクト**: 識別子を持たない不変オブジェクト（例: PanelInfo,
//!   RequestStatus）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、メールプロバイダー）には一切依存しない。
//! メール送信の具体的な手段は infra 層のトランスポートが担い、ここでは
//! 通知イベントとメッセージの形だけを定義する。
//!
//! ## モジュール構成
//!
//! - [`damage_request`] - リカット依頼エンティティとパネル情報
//! - [`notification`] - メール通知に関するドメインモデル
//! - [`error`] - ドメイン層で発生するエラーの定義

#[macro_use]
mod macros;

pub mod damage_request;
pub mod error;
pub mod notification;

pub use error::DomainError;
