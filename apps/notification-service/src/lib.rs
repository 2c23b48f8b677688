//! # Notification Service ライブラリ
//!
//! 設定・ハンドラ・ユースケースとルーター構築を公開する。
//! 統合テストは [`app::build_app`] にモックを注入して Router を組み立てる。

pub mod app;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
