//! Liveness and readiness checks for the load balancer.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::AppState;

/// Body of both health endpoints.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy`, `ready` or `unavailable`.
    pub status: &'static str,
    /// Crate version of the running server.
    pub version: &'static str,
    /// `up` or `down`; omitted by the liveness check, which never touches Postgres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,
}

async fn live() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        database: None,
    })
}

/// 503 until the pool can reach Postgres, so instances are not routed traffic they would fail.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ready",
                version: env!("CARGO_PKG_VERSION"),
                database: Some("up"),
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "readiness check could not reach the database");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    version: env!("CARGO_PKG_VERSION"),
                    database: Some("down"),
                }),
            )
        }
    }
}

/// `/health` for liveness, `/health/ready` for readiness.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(live))
        .route("/health/ready", get(ready))
}
