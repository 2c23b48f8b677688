//! # 通知
//!
//! 1 受信者分の送信単位（[`Notification`]）と、その送信時に発生するエラーを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 |
//! |---|------------|
//! | [`Notification`] | 送信単位。オーケストレータが受信者ごとに構築し、Sender が即座に消費する |
//! | [`NotificationData`] | テンプレートのプレースホルダーに差し込む値 |
//! | [`template_name`] | テンプレートの合成キー `event_lang` |
//!
//! ## 設計方針
//!
//! - **借用による構築**: `Notification` は送信者・受信者・データを所有せず参照する
//! - **最小限の置換**: `{{KEY}}` のリテラル置換のみ。テンプレートエンジンは導入しない

use std::collections::BTreeMap;

use thiserror::Error;

use crate::identity::Info;

/// テンプレートに差し込むデータ
///
/// キーは一意。参照側はキーを大文字化してから検索する。
pub type NotificationData = BTreeMap<String, String>;

/// 送信者の表示名を格納する予約キー
pub const FROM_KEY: &str = "FROM";

/// 現在の受信者の表示名を格納する予約キー
pub const TO_KEY: &str = "TO";

/// テンプレート名を組み立てる
///
/// `event` と `lang` をアンダースコアで連結する。エスケープは行わないため、
/// `event` がアンダースコアを含む場合は名前が衝突しうる。
pub fn template_name(event: &str, lang: &str) -> String {
    format!("{event}_{lang}")
}

/// 通知の送信単位
#[derive(Debug, Clone)]
pub struct Notification<'a> {
    /// イベント名
    pub event:   &'a str,
    /// 言語キー
    pub lang:    &'a str,
    /// 送信者
    pub from:    &'a Info,
    /// 受信者（1 件以上）
    pub send_to: Vec<&'a Info>,
    /// プレースホルダーデータ
    pub data:    &'a NotificationData,
}

impl Notification<'_> {
    /// この通知に対応するテンプレート名
    pub fn template_name(&self) -> String {
        template_name(self.event, self.lang)
    }

    /// キーを大文字化したデータを返す
    ///
    /// 大文字化で衝突した場合は元から大文字のキーの値を優先する。
    /// 小文字の `to` や `from` が予約キー `TO` / `FROM` を上書きすることはない。
    pub fn upper_key_data(&self) -> NotificationData {
        let mut upper = NotificationData::new();
        for (key, value) in self.data {
            let upper_key = key.to_uppercase();
            if *key == upper_key {
                upper.insert(upper_key, value.clone());
            } else {
                upper.entry(upper_key).or_insert_with(|| value.clone());
            }
        }
        upper
    }

    /// 受信者のメールアドレス
    pub fn recipient_emails(&self) -> Vec<&str> {
        self.send_to.iter().map(|info| info.email.as_str()).collect()
    }
}

/// `{{KEY}}` を対応する値で置換する
///
/// 一致しないプレースホルダーはそのまま残る。
pub fn substitute_placeholders(text: &str, upper_data: &NotificationData) -> String {
    upper_data
        .iter()
        .fold(text.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{{{key}}}}}"), value)
        })
}

/// 通知送信エラー
///
/// 受信者単位のエラー。集約されて部分失敗・全体失敗として報告される。
#[derive(Debug, Error)]
pub enum NotificationError {
    /// `event_lang` のテンプレートが存在しない
    #[error("template does not exist: {0}")]
    TemplateNotFound(String),

    /// 受信者が指定されていない
    #[error("no recipients specified")]
    NoRecipients,

    /// テンプレートストアへの問い合わせに失敗
    #[error("failed to look up template: {0}")]
    TemplateStore(String),

    /// メールアドレスが不正
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// プロバイダが送信を拒否した、または送信に失敗した
    #[error("failed to send email: {0}")]
    SendFailed(String),
}
