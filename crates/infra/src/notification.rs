//! # 通知送信
//!
//! 1 受信者分の通知をメールとして送信するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でプロバイダごとの送信を抽象化
//! - **2 つの実装**: SES（テンプレート送信 API）、SMTP（`{{KEY}}` 置換して送信）
//! - **テンプレート確認は送信ごと**: 同じ言語グループでも毎回テンプレートストアに問い合わせる

mod ses;
mod smtp;

use async_trait::async_trait;
use notifaction_domain::{Notification, NotificationError};
pub use ses::SesNotificationSender;
pub use smtp::{SmtpNotificationSender, SmtpSettings};

/// メール送信トレイト
///
/// 送信に成功するとプロバイダが発行したメッセージ ID を返す。
/// SMTP のように ID を発行しないプロバイダは空文字列を返す。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 通知を送信する
    async fn send(&self, notification: &Notification<'_>) -> Result<String, NotificationError>;
}
