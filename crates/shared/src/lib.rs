//! # Notifaction 共有ユーティリティ
//!
//! 通知サービスで使用する横断的なユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - トレーシング関連の依存は `observability` feature の背後に置く

pub mod event_log;
pub mod observability;
pub mod response;

#[cfg(feature = "observability")]
pub mod canonical_log;

pub use response::{ApiResponse, ErrorResponse, MessageResponse};
