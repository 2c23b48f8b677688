//! # 通知ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /notification` - 通知を作成し、受信者ごとにメールを送信する
//!
//! ## レスポンス
//!
//! | ステータス | ボディ | 条件 |
//! |-----------|--------|------|
//! | 202 | `{"data": [{email, message_id, lang, from, event}]}` | 全件送信成功 |
//! | 206 | `[{error, email}]` | 一部失敗 |
//! | 400 | `{"error": "..."}` | ボディ不正・検証エラー |
//! | 500 | `{"error": "..."}` | 全件失敗・設定不備・識別情報の解決失敗 |

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use notifaction_domain::{CreateNotificationRequest, NotificationData};
use notifaction_shared::ApiResponse;

use crate::{
    error::NotificationServiceError,
    usecase::{DispatchOutcome, DispatchUseCaseImpl},
};

/// 通知 API の共有状態
pub struct NotificationState {
    pub usecase:        DispatchUseCaseImpl,
    /// テンプレートデータに転送するヘッダー名
    pub header_to_data: Vec<String>,
}

/// POST /notification
#[tracing::instrument(skip_all)]
pub async fn create_notification(
    State(state): State<Arc<NotificationState>>,
    headers: HeaderMap,
    payload: Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> Result<Response, NotificationServiceError> {
    let Json(request) =
        payload.map_err(|rejection| NotificationServiceError::InvalidBody(rejection.body_text()))?;

    let forwarded = forwarded_headers(&state.header_to_data, &headers);
    let outcome = state.usecase.dispatch(request, forwarded).await?;

    let response = match outcome {
        DispatchOutcome::Delivered(delivered) => {
            (StatusCode::ACCEPTED, Json(ApiResponse::new(delivered))).into_response()
        }
        DispatchOutcome::Partial { failed, .. } => {
            (StatusCode::PARTIAL_CONTENT, Json(failed)).into_response()
        }
    };
    Ok(response)
}

/// 設定されたヘッダーの値をテンプレートデータとして取り出す
///
/// リクエストに存在しない（または UTF-8 として読めない）ヘッダーは
/// `missing header: <name>` を値とする。キーは設定されたヘッダー名のまま。
pub fn forwarded_headers(names: &[String], headers: &HeaderMap) -> NotificationData {
    names
        .iter()
        .map(|name| {
            let value = headers
                .get(name.as_str())
                .and_then(|value| value.to_str().ok())
                .map_or_else(|| format!("missing header: {name}"), str::to_string);
            (name.clone(), value)
        })
        .collect()
}
