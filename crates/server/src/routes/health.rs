//! Health check endpoint

use axum::{Json, response::IntoResponse};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
}

/// GET /health - Liveness check
///
/// Both collaborators are pay-per-call remote services, so health does not
/// probe them; it reports that the process is up and configured.
pub async fn check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}
