//! Health check endpoint.
//!
//! Provides a liveness check that also checks the database, for monitoring
//! and container orchestration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Response body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
    pub server_time: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// `200` when the database answers, `503` otherwise.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;

    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        warn!("Health check failed: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label,
            database,
            version: env!("CARGO_PKG_VERSION"),
            server_time: Utc::now().to_rfc3339(),
        }),
    )
}
