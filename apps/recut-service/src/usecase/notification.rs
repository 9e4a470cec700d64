//! # 通知ユースケース
//!
//! 依頼操作に伴うメール通知の生成・送信を統合する。
//!
//! ## モジュール構成
//!
//! - [`template_renderer`] - tera テンプレートエンジンによるメール生成
//! - [`service`] - 設定判定 + レンダリング + 送信を統合するディスパッチャ

pub mod service;
pub mod template_renderer;

pub use service::{NotificationDispatcher, ProviderTransports};
pub use template_renderer::TemplateRenderer;
