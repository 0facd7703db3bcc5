//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let (status, database, code) = match state.health.ping().await {
        Ok(()) => ("ok", "connected", StatusCode::OK),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            ("degraded", "unavailable", StatusCode::SERVICE_UNAVAILABLE)
        }
    };

    (
        code,
        Json(ApiResponse::ok(HealthResponse {
            status: status.to_string(),
            database: database.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })),
    )
}
