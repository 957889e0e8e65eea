//! Health check handler.

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use booble_database::connection::ping;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/v1/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = ping(&state.db_pool).await.unwrap_or(false);

    Json(ApiResponse::ok(HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        database,
        active_uploads: state.upload_service.active_sessions(),
    }))
}
