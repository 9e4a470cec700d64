//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックはユースケース層に委譲
//! - DTO は UI の命名規約（camelCase）でシリアライズする

pub mod damage_request;
pub mod health;
pub mod send_email;

pub use damage_request::{
   DamageRequestState,
   create_damage_request,
   delete_damage_request,
   get_damage_request,
   list_damage_requests,
   update_damage_request_status,
};
pub use health::health_check;
pub use send_email::{SendEmailState, send_email};
