//! # アプリケーション構築
//!
//! 依存コンポーネント（State）の初期化とルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post, put},
};
use notifaction_infra::{IdentityResolver, SenderFactory, TemplateStore};
use notifaction_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    config::AppConfig,
    handler::{
        NotificationState,
        ReadinessLatch,
        ReadinessState,
        TemplateState,
        apply_template,
        create_notification,
        delete_template,
        get_template,
        header_to_post,
        health_alive,
        list_templates,
        readiness_check,
    },
    usecase::{DispatchUseCaseImpl, TemplateUseCaseImpl},
};

/// 外部との境界になるコンポーネント
#[derive(Clone)]
pub struct Dependencies {
    pub identity:  Arc<dyn IdentityResolver>,
    pub templates: Arc<dyn TemplateStore>,
    pub senders:   Arc<dyn SenderFactory>,
}

/// ルーティングと送信の挙動に関わる設定
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub header_to_data:   Vec<String>,
    pub send_delay:       Duration,
    pub api_test_enabled: bool,
}

impl From<&AppConfig> for AppOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            header_to_data:   config.header_to_data.clone(),
            send_delay:       config.send_delay,
            api_test_enabled: config.api_test_enabled,
        }
    }
}

/// State の構築とルーター定義を行う
pub fn build_app(deps: Dependencies, options: AppOptions) -> Router {
    let readiness_state = Arc::new(ReadinessState {
        identity:  deps.identity.clone(),
        templates: deps.templates.clone(),
        latch:     ReadinessLatch::new(),
    });

    let notification_state = Arc::new(NotificationState {
        usecase:        DispatchUseCaseImpl::new(deps.identity, deps.senders, options.send_delay),
        header_to_data: options.header_to_data,
    });

    let template_state = Arc::new(TemplateState {
        usecase: TemplateUseCaseImpl::new(deps.templates),
    });

    let mut app = Router::new()
        .route("/health/alive", get(health_alive))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .merge(
            Router::new()
                .route("/notification", post(create_notification))
                .with_state(notification_state),
        )
        .merge(
            Router::new()
                .route("/templates", put(apply_template).get(list_templates))
                .route("/templates/{name}", get(get_template).delete(delete_template))
                .with_state(template_state),
        );

    if options.api_test_enabled {
        app = app.route("/test/header2post", post(header_to_post));
    }

    // 下に書いたものが外側
    app.layer(PropagateRequestIdLayer::x_request_id())
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
