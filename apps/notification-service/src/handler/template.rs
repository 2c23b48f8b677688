//! # テンプレート管理ハンドラ
//!
//! ## エンドポイント
//!
//! - `PUT /templates` - テンプレートを登録する（存在すれば更新）
//! - `GET /templates` - テンプレート一覧（`next_token` でページ送り）
//! - `GET /templates/{name}` - テンプレート詳細
//! - `DELETE /templates/{name}` - テンプレート削除

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use notifaction_domain::TemplateInput;
use notifaction_shared::ApiResponse;
use serde::Deserialize;

use crate::{error::NotificationServiceError, usecase::TemplateUseCaseImpl};

/// テンプレート API の共有状態
pub struct TemplateState {
    pub usecase: TemplateUseCaseImpl,
}

/// 一覧のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListTemplatesQuery {
    pub next_token: Option<String>,
}

/// PUT /templates
pub async fn apply_template(
    State(state): State<Arc<TemplateState>>,
    payload: Result<Json<TemplateInput>, JsonRejection>,
) -> Result<impl IntoResponse, NotificationServiceError> {
    let Json(input) =
        payload.map_err(|rejection| NotificationServiceError::InvalidBody(rejection.body_text()))?;

    let applied = state.usecase.apply(input).await?;
    Ok((StatusCode::OK, Json(ApiResponse::new(applied))))
}

/// GET /templates
pub async fn list_templates(
    State(state): State<Arc<TemplateState>>,
    Query(query): Query<ListTemplatesQuery>,
) -> Result<impl IntoResponse, NotificationServiceError> {
    let next_token = query.next_token.as_deref().filter(|token| !token.is_empty());

    let page = state.usecase.list(next_token).await?;
    Ok(Json(ApiResponse::new(page)))
}

/// GET /templates/{name}
pub async fn get_template(
    State(state): State<Arc<TemplateState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, NotificationServiceError> {
    let content = state.usecase.detail(&name).await?;
    Ok(Json(ApiResponse::new(content)))
}

/// DELETE /templates/{name}
pub async fn delete_template(
    State(state): State<Arc<TemplateState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, NotificationServiceError> {
    state.usecase.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}
