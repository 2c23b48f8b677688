//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュールで re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックは usecase 層に委譲
//!
//! ## ハンドラ一覧
//!
//! - `health`: Liveness / Readiness
//! - `notification`: 通知の作成
//! - `template`: テンプレート管理
//! - `test_echo`: ヘッダー転送の動作確認用エンドポイント

pub mod health;
pub mod notification;
pub mod template;
pub mod test_echo;

pub use health::{ReadinessLatch, ReadinessState, health_alive, readiness_check};
pub use notification::{NotificationState, create_notification, forwarded_headers};
pub use template::{
    ListTemplatesQuery,
    TemplateState,
    apply_template,
    delete_template,
    get_template,
    list_templates,
};
pub use test_echo::{NOTIFY_HEADER, header_to_post};
