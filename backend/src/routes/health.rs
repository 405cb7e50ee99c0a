//! Health check endpoints
//!
//! - /health - Basic health check
//! - /health/ready - Readiness probe (checks the user store)
//! - /health/live - Liveness probe

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub store: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn response(status: &str, checks: Option<HealthChecks>) -> HealthResponse {
    HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(response("healthy", None))
}

/// Readiness probe; 503 when the store cannot be reached
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    match state.users().ping().await {
        Ok(()) => {
            let store = CheckStatus {
                status: "healthy".to_string(),
                message: None,
            };
            Ok(Json(response("ready", Some(HealthChecks { store }))))
        }
        Err(e) => {
            warn!(error = %e, "Store readiness check failed");
            let store = CheckStatus {
                status: "unhealthy".to_string(),
                message: Some(e.to_string()),
            };
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(response("not_ready", Some(HealthChecks { store }))),
            ))
        }
    }
}

pub async fn liveness_check() -> Json<HealthResponse> {
    Json(response("alive", None))
}
