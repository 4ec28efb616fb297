//! Collaborator seams for the query pipeline.
//!
//! The pipeline suspends in exactly two places: the LLM translation call and
//! the warehouse execution call. Both are expressed as traits so the server
//! can wire in real HTTP clients while tests substitute in-memory fakes.
//! Neither side retries; a failure aborts the request.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// A single result row: column name to scalar value, in projection order.
pub type Row = serde_json::Map<String, JsonValue>;

/// Failure from the LLM completion endpoint.
#[derive(Debug, Error)]
#[error("LLM request failed: {0}")]
pub struct LlmError(pub String);

/// Failure from the analytical warehouse.
///
/// The provider message is carried verbatim so the server layer can
/// classify it (syntax error, missing resource, timeout) by substring.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct WarehouseError(pub String);

/// An LLM completion endpoint.
///
/// Implementations fix temperature at 0 so translation is as deterministic
/// as the provider allows.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a text completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// An analytical warehouse that executes SQL and returns row mappings.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Execute a query and return all result rows in order.
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, WarehouseError>;
}
