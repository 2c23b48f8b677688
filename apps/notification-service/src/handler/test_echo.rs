//! # テスト用エコーハンドラ
//!
//! `API_TEST_ENABLED=true` のときだけルーティングされる。
//! リクエストボディを base64 にしてレスポンスヘッダーへ載せ、
//! ヘッダー転送を行うゲートウェイの動作確認に使う。

use axum::{Json, body::Bytes, response::IntoResponse};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use notifaction_shared::MessageResponse;

/// ボディのエンコード結果を載せるレスポンスヘッダー
pub const NOTIFY_HEADER: &str = "x-notify";

/// POST /test/header2post
pub async fn header_to_post(body: Bytes) -> impl IntoResponse {
    let encoded = STANDARD.encode(&body);
    (
        [(NOTIFY_HEADER, encoded)],
        Json(MessageResponse::new("success")),
    )
}
