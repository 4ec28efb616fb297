//! HTTP middleware

pub mod auth;
pub mod metrics;
pub mod rate_limit;
pub mod request_id;

pub use auth::ApiKeyAuth;
pub use metrics::metrics_middleware;
pub use rate_limit::{create_rate_limiter, rate_limit_middleware};
pub use request_id::request_id_middleware;
