//! # ヘルスチェックハンドラ
//!
//! - `/health/alive`: Liveness Check（常に 200）
//! - `/health/ready`: Readiness Check（Identity サービスとテンプレートストアを確認）
//!
//! ## Readiness のラッチ
//!
//! 各依存先は一度成功したら以降は再確認しない。プロセスが生きている間、
//! Ready から未 Ready に戻ることはない。

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use axum::{Json, extract::State};
use notifaction_infra::{IdentityResolver, TemplateStore};
use notifaction_shared::MessageResponse;

use crate::error::NotificationServiceError;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// 依存先ごとの Ready フラグ
///
/// `false` で初期化し、`true` への遷移のみを許す。
#[derive(Debug, Default)]
pub struct ReadinessLatch {
    identity: AtomicBool,
    email:    AtomicBool,
}

impl ReadinessLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_identity_ready(&self) -> bool {
        self.identity.load(Ordering::Acquire)
    }

    pub fn is_email_ready(&self) -> bool {
        self.email.load(Ordering::Acquire)
    }

    fn mark_identity_ready(&self) {
        self.identity.store(true, Ordering::Release);
    }

    fn mark_email_ready(&self) {
        self.email.store(true, Ordering::Release);
    }
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub identity:  Arc<dyn IdentityResolver>,
    pub templates: Arc<dyn TemplateStore>,
    pub latch:     ReadinessLatch,
}

/// Liveness Check エンドポイント
pub async fn health_alive() -> Json<MessageResponse> {
    Json(MessageResponse::new("I am alive"))
}

/// Readiness Check エンドポイント
///
/// Identity サービス → テンプレートストアの順に確認し、最初の失敗を 500 で返す。
/// 確認済みの依存先はスキップする。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(
    State(state): State<Arc<ReadinessState>>,
) -> Result<Json<MessageResponse>, NotificationServiceError> {
    if !state.latch.is_identity_ready() {
        check_identity(state.identity.as_ref()).await?;
        state.latch.mark_identity_ready();
        tracing::info!("identity service is ready");
    }

    if !state.latch.is_email_ready() {
        check_email(state.templates.as_ref()).await?;
        state.latch.mark_email_ready();
        tracing::info!("email service is ready");
    }

    Ok(Json(MessageResponse::new("service notification is ready")))
}

/// Identity サービスの `/admin/health/ready` を確認する（タイムアウト: 5 秒）
async fn check_identity(identity: &dyn IdentityResolver) -> Result<(), NotificationServiceError> {
    match tokio::time::timeout(PROBE_TIMEOUT, identity.is_ready()).await {
        Ok(Ok(true)) => Ok(()),
        Ok(Ok(false)) => Err(NotificationServiceError::NotReady(
            "identity service is not ready".to_string(),
        )),
        Ok(Err(e)) => Err(NotificationServiceError::NotReady(format!(
            "identity service is not ready: {e}"
        ))),
        Err(_) => Err(NotificationServiceError::NotReady(
            "identity service is not ready: timed out".to_string(),
        )),
    }
}

/// テンプレートストアの一覧取得が成功するか確認する（タイムアウト: 5 秒）
async fn check_email(templates: &dyn TemplateStore) -> Result<(), NotificationServiceError> {
    match tokio::time::timeout(PROBE_TIMEOUT, templates.list(None)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(NotificationServiceError::NotReady(format!(
            "email service is not ready: {e}"
        ))),
        Err(_) => Err(NotificationServiceError::NotReady(
            "email service is not ready: timed out".to_string(),
        )),
    }
}
