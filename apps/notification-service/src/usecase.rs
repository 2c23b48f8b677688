//! # ユースケース層
//!
//! ハンドラから呼び出されるアプリケーションロジックを定義する。
//!
//! ## モジュール構成
//!
//! - [`dispatch`] - 通知のファンアウト送信と結果の集約
//! - [`template`] - テンプレートの登録・参照・削除

pub mod dispatch;
pub mod template;

pub use dispatch::{DeliveredNotification, DispatchOutcome, DispatchUseCaseImpl, FailedNotification};
pub use template::{AppliedTemplate, TemplateUseCaseImpl};
