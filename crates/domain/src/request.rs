//! # 通知作成リクエスト
//!
//! `POST /notification` のリクエストボディと、その検証ルールを定義する。
//! 検証は外部呼び出しより前に行う。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notification::NotificationData;

/// リクエスト・テンプレート入力の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty to")]
    EmptyTo,

    #[error("empty from")]
    EmptyFrom,

    #[error("empty event")]
    EmptyEvent,

    #[error("empty data")]
    MissingData,

    #[error("template event is required")]
    EmptyTemplateEvent,

    #[error("template lang is required")]
    EmptyTemplateLang,

    #[error("template subject is required")]
    EmptyTemplateSubject,

    #[error("template body (html or text) is required")]
    EmptyTemplateBody,
}

/// 通知作成リクエスト
///
/// フィールドの欠落はデシリアライズでは拒否せず、[`validate`](Self::validate) で検出する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNotificationRequest {
    /// 受信者のサブジェクト ID
    #[serde(default)]
    pub to:    Vec<String>,
    /// 送信者のサブジェクト ID
    #[serde(default)]
    pub from:  String,
    /// イベント名
    #[serde(default)]
    pub event: String,
    /// テンプレートデータ（空でもよいが存在は必須）
    #[serde(default)]
    pub data:  Option<NotificationData>,
}

impl CreateNotificationRequest {
    /// リクエストを検証する
    ///
    /// `to` → `from` → `event` → `data` の順に検査し、最初の違反を返す。
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.to.is_empty() {
            return Err(ValidationError::EmptyTo);
        }
        if self.from.is_empty() {
            return Err(ValidationError::EmptyFrom);
        }
        if self.event.is_empty() {
            return Err(ValidationError::EmptyEvent);
        }
        if self.data.is_none() {
            return Err(ValidationError::MissingData);
        }
        Ok(())
    }
}
