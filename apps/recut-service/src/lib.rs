//! # Recut Service ライブラリ
//!
//! Recut Service のユースケースとハンドラを公開する。
//! 統合テストはここからルーター構築関数と State を利用する。

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
