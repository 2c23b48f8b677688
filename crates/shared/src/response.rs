//! # HTTP レスポンスボディ
//!
//! 通知サービスが返す JSON ボディの共通形を提供する。
//!
//! | 型 | 形 | 用途 |
//! |---|---|---|
//! | [`ApiResponse`] | `{"data": T}` | テンプレート管理 API の成功レスポンス |
//! | [`ErrorResponse`] | `{"error": "..."}` | リクエスト単位のエラー |
//! | [`MessageResponse`] | `{"message": "..."}` | ヘルスチェック・テスト用エンドポイント |
//!
//! axum の `IntoResponse` 変換は各サービスの責務とし、このクレートには axum 依存を入れない。

use serde::{Deserialize, Serialize};

/// `{"data": T}` 形式のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// `{"error": "..."}` 形式のレスポンス
///
/// ## 使用例
///
/// ```
/// use notifaction_shared::ErrorResponse;
///
/// let body = ErrorResponse::new("empty to");
/// assert_eq!(body.error, "empty to");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// `{"message": "..."}` 形式のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
