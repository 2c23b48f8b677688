//! # Notifaction ドメイン層
//!
//! 通知ディスパッチの中核となる型と規則を定義する。
//!
//! ## 設計方針
//!
//! - **I/O を持たない**: Identity サービスやメールプロバイダとの通信はインフラ層が担う
//! - **エラー分類を型で表現**: 検証・設定・送信の各エラーを個別の列挙型で区別する
//!
//! ## 依存関係の方向
//!
//! ```text
//! notification-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`identity`] - 送信者・受信者の識別情報と言語別分類
//! - [`notification`] - 送信単位とテンプレート名、プレースホルダー置換
//! - [`request`] - 通知作成リクエストと検証エラー
//! - [`template`] - テンプレート本体・一覧・適用結果
//! - [`provider`] - メールプロバイダの選択と設定エラー
//!
//! ## 使用例
//!
//! ```rust
//! use notifaction_domain::notification::template_name;
//!
//! assert_eq!(template_name("welcome", "en"), "welcome_en");
//! ```

pub mod identity;
pub mod notification;
pub mod provider;
pub mod request;
pub mod template;

pub use identity::{ClassificationLang, Info, ResolvedIdentity};
pub use notification::{Notification, NotificationData, NotificationError};
pub use provider::{ConfigurationError, MailProvider};
pub use request::{CreateNotificationRequest, ValidationError};
pub use template::{ApplyOutcome, TemplateContent, TemplateInput, TemplatePage, TemplateStoreError};
