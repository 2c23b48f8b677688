//! # メールテンプレート
//!
//! テンプレートストアとやり取りする値を定義する。
//! テンプレートは `event_lang` の合成キーで識別される（[`template_name`]）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

use crate::{notification::template_name, request::ValidationError};

/// テンプレート本体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateContent {
    /// 件名
    pub subject: String,
    /// HTML 本文
    pub html:    String,
    /// プレーンテキスト本文
    pub text:    String,
}

/// テンプレート登録・更新の入力
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateInput {
    #[serde(default)]
    pub event:   String,
    #[serde(default)]
    pub lang:    String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub html:    String,
    #[serde(default)]
    pub text:    String,
}

impl TemplateInput {
    /// 入力を検証する
    ///
    /// event, lang, subject は必須。本文は HTML とテキストの少なくとも一方が必要。
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.event.is_empty() {
            return Err(ValidationError::EmptyTemplateEvent);
        }
        if self.lang.is_empty() {
            return Err(ValidationError::EmptyTemplateLang);
        }
        if self.subject.is_empty() {
            return Err(ValidationError::EmptyTemplateSubject);
        }
        if self.html.is_empty() && self.text.is_empty() {
            return Err(ValidationError::EmptyTemplateBody);
        }
        Ok(())
    }

    /// テンプレート名（`event_lang`）
    pub fn name(&self) -> String {
        template_name(&self.event, &self.lang)
    }

    /// テンプレート本体を取り出す
    pub fn content(&self) -> TemplateContent {
        TemplateContent {
            subject: self.subject.clone(),
            html:    self.html.clone(),
            text:    self.text.clone(),
        }
    }
}

/// テンプレート一覧の 1 要素
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub name:       String,
    pub created_at: Option<DateTime<Utc>>,
}

/// テンプレート一覧の 1 ページ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplatePage {
    /// 次ページのトークン（最終ページでは `None`）
    pub next_token: Option<String>,
    pub templates:  Vec<TemplateSummary>,
}

/// テンプレート適用の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplyOutcome {
    Created,
    Updated,
}

/// テンプレートストアのエラー
#[derive(Debug, Error)]
pub enum TemplateStoreError {
    /// テンプレートが存在しない
    #[error("template does not exist: {0}")]
    NotFound(String),

    /// プロバイダ API の呼び出しに失敗
    #[error("template store error: {0}")]
    Provider(String),
}
