use axum::extract::State;
use axum::Json;
use chrono::Utc;
use sarathi_core::types::Timestamp;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `ok` while the process is serving.
    pub status: &'static str,
    /// `connected` or `disconnected`.
    pub database: &'static str,
    pub timestamp: Timestamp,
}

/// GET /api/health -- service and database health.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match sarathi_db::health_check(&state.pool).await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: "ok",
        database,
        timestamp: Utc::now(),
    })
}

/// GET / -- plain-text greeting.
pub async fn welcome() -> &'static str {
    "Welcome to Sarathi"
}
