//! # ヘルスチェックハンドラ
//!
//! ```text
//! GET /health
//! ```

use axum::Json;
use cinemail_shared::HealthResponse;

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}
