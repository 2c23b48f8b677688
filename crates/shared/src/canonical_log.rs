//! # Canonical Log Line ミドルウェア
//!
//! HTTP リクエスト完了時に、メソッド・パス・ステータス・レイテンシを 1 行に集約した
//! サマリログを出力する tower Layer。
//!
//! ## ログレベル
//!
//! | ステータス | レベル | 意味 |
//! |------------|--------|------|
//! | 5xx | ERROR | 全件失敗・設定不備 |
//! | 206 / 4xx | WARN | 一部失敗・入力不正 |
//! | その他 | INFO | 正常 |
//!
//! `TraceLayer` の内側に配置し、リクエストスパンのフィールド（`request_id`）を
//! JSON ログに含める。

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use http::{Request, Response, StatusCode};
use tower::{Layer, Service};

/// ヘルスチェックパス（`/health/alive`, `/health/ready`）かどうか
fn is_health_check_path(path: &str) -> bool {
    path.starts_with("/health")
}

/// Canonical Log Line を出力する Layer
///
/// ```text
/// SetRequestIdLayer → TraceLayer → CanonicalLogLineLayer → handler
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalLogLineLayer;

impl<S> Layer<S> for CanonicalLogLineLayer {
    type Service = CanonicalLogLineService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CanonicalLogLineService { inner }
    }
}

#[derive(Clone, Debug)]
pub struct CanonicalLogLineService<S> {
    inner: S,
}

/// リクエストの要約
struct RequestSummary {
    method: http::Method,
    path:   String,
    start:  Instant,
}

impl RequestSummary {
    fn latency_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn emit(&self, status: StatusCode) {
        let latency_ms = self.latency_ms();
        let method = self.method.as_str();
        let path = self.path.as_str();
        let status = status.as_u16();

        if status >= 500 {
            tracing::error!(
                log.r#type = "canonical",
                http.method = method,
                http.path = path,
                http.status_code = status,
                http.latency_ms = latency_ms,
                "リクエスト失敗"
            );
        } else if status >= 400 || status == StatusCode::PARTIAL_CONTENT.as_u16() {
            tracing::warn!(
                log.r#type = "canonical",
                http.method = method,
                http.path = path,
                http.status_code = status,
                http.latency_ms = latency_ms,
                "リクエスト完了（一部失敗または入力不正）"
            );
        } else {
            tracing::info!(
                log.r#type = "canonical",
                http.method = method,
                http.path = path,
                http.status_code = status,
                http.latency_ms = latency_ms,
                "リクエスト完了"
            );
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CanonicalLogLineService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::fmt::Display + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // poll_ready 済みの inner を取り出し、代わりにクローンを残す
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        if is_health_check_path(req.uri().path()) {
            return Box::pin(async move { inner.call(req).await });
        }

        let summary = RequestSummary {
            method: req.method().clone(),
            path:   req.uri().path().to_owned(),
            start:  Instant::now(),
        };

        Box::pin(async move {
            let result = inner.call(req).await;

            match &result {
                Ok(response) => summary.emit(response.status()),
                Err(err) => {
                    tracing::error!(
                        log.r#type = "canonical",
                        http.method = summary.method.as_str(),
                        http.path = summary.path.as_str(),
                        http.latency_ms = summary.latency_ms(),
                        error.message = %err,
                        "リクエスト処理エラー"
                    );
                }
            }

            result
        })
    }
}
