//! # Notifaction インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! 外部サービスの詳細を trait の背後にカプセル化し、ユースケースには
//! `Arc<dyn Trait>` として注入する。テストでは [`mock`] のインメモリ実装に差し替える。
//!
//! ## 責務
//!
//! - **Identity サービス**: サブジェクト ID から識別情報を取得（reqwest）
//! - **テンプレートストア**: SES の EmailTemplate API による CRUD
//! - **メール送信**: SES テンプレート送信 / SMTP 送信（lettre）
//!
//! ## 依存関係
//!
//! ```text
//! notification-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`error`] - インフラ層エラー定義
//! - [`identity`] - Identity サービスクライアント
//! - [`notification`] - メール送信の実装
//! - [`sender_factory`] - プロバイダ設定に基づく送信者の生成
//! - [`ses`] - SES クライアントの生成
//! - [`template_store`] - テンプレートストア

pub mod error;
pub mod identity;
pub mod notification;
pub mod sender_factory;
pub mod ses;
pub mod template_store;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::InfraError;
pub use identity::{HttpIdentityResolver, IdentityResolver, ResolutionError};
pub use notification::NotificationSender;
pub use sender_factory::{MailSenderFactory, SenderFactory};
pub use template_store::{SesTemplateStore, TemplateStore};
