pub mod health;
pub mod metrics;
pub mod query;

use axum::{Router, routing::post};

use crate::AppState;

/// Build the query API routes
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/api/query", post(query::submit))
}
