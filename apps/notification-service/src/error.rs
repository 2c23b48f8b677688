//! # Notification Service エラー定義
//!
//! リクエスト単位のエラーと、HTTP レスポンスへの変換を定義する。
//! レスポンスボディは常に `{"error": "<message>"}` 形式。
//!
//! | エラー | ステータス |
//! |--------|-----------|
//! | 入力不正・検証エラー | 400 |
//! | テンプレートが存在しない（管理 API） | 404 |
//! | 設定不備・識別情報の解決失敗・全件送信失敗・未 Ready | 500 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use notifaction_domain::{ConfigurationError, TemplateStoreError, ValidationError};
use notifaction_infra::ResolutionError;
use notifaction_shared::{
    ErrorResponse,
    event_log::error::{category, kind},
};
use thiserror::Error;

/// Notification Service で発生するエラー
#[derive(Debug, Error)]
pub enum NotificationServiceError {
    /// リクエストボディを解釈できない
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// リクエストの検証エラー
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 設定不備
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// 識別情報の解決に失敗
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// 全受信者への送信に失敗（最初のエラーメッセージを保持する）
    #[error("{0}")]
    AllFailed(String),

    /// テンプレートが存在しない
    #[error("template does not exist")]
    TemplateNotFound(String),

    /// テンプレートストアの呼び出しに失敗
    #[error(transparent)]
    TemplateStore(TemplateStoreError),

    /// 依存サービスが Ready でない
    #[error("{0}")]
    NotReady(String),
}

impl From<TemplateStoreError> for NotificationServiceError {
    fn from(err: TemplateStoreError) -> Self {
        match err {
            TemplateStoreError::NotFound(name) => Self::TemplateNotFound(name),
            other => Self::TemplateStore(other),
        }
    }
}

impl NotificationServiceError {
    /// 対応する HTTP ステータス
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::TemplateNotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_)
            | Self::Resolution(_)
            | Self::AllFailed(_)
            | Self::TemplateStore(_)
            | Self::NotReady(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// ログに付与するエラーコンテキスト
    ///
    /// 呼び出し側の不備（400 / 404）と readiness は `None`。
    pub fn log_context(&self) -> Option<ErrorLogContext> {
        let (category, kind, message) = match self {
            Self::Configuration(_) => (category::CONFIGURATION, kind::MAIL_PROVIDER, "設定エラー"),
            Self::Resolution(_) => (
                category::EXTERNAL_SERVICE,
                kind::IDENTITY_RESOLUTION,
                "識別情報の解決に失敗",
            ),
            Self::TemplateStore(_) => (
                category::EXTERNAL_SERVICE,
                kind::TEMPLATE_STORE,
                "テンプレートストアエラー",
            ),
            Self::AllFailed(_) => (
                category::EXTERNAL_SERVICE,
                kind::MAIL_PROVIDER,
                "全受信者への送信に失敗",
            ),
            Self::InvalidBody(_)
            | Self::Validation(_)
            | Self::TemplateNotFound(_)
            | Self::NotReady(_) => return None,
        };
        Some(ErrorLogContext {
            category,
            kind,
            message,
        })
    }
}

/// `error.category` / `error.kind` とログメッセージ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorLogContext {
    pub category: &'static str,
    pub kind:     &'static str,
    pub message:  &'static str,
}

impl IntoResponse for NotificationServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Some(context) = self.log_context() {
            tracing::error!(
                error.category = context.category,
                error.kind = context.kind,
                error = %self,
                "{}",
                context.message
            );
        } else if let Self::NotReady(e) = &self {
            tracing::warn!(error = %e, "readiness check failed");
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
