//! Request execution configuration

use serde::Serialize;
use serde_json::Value as JsonValue;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 1000;

/// How a query should be executed, derived from the request body.
///
/// `count_only` and pagination are mutually exclusive in the response
/// metadata; `dry_run` suppresses execution entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionConfig {
    pub limit: i64,
    pub offset: i64,
    pub dry_run: bool,
    pub count_only: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            dry_run: false,
            count_only: false,
        }
    }
}

impl ExecutionConfig {
    /// Parse execution options leniently from a JSON request body.
    ///
    /// Integers and numeric strings are accepted for `limit`/`offset`;
    /// anything unparseable falls back to the default. `limit` is clamped
    /// to [1, 1000] and `offset` to ≥ 0.
    pub fn from_request(body: &JsonValue) -> Self {
        Self {
            limit: integer_option(body, "limit", DEFAULT_LIMIT).clamp(MIN_LIMIT, MAX_LIMIT),
            offset: integer_option(body, "offset", 0).max(0),
            dry_run: bool_option(body, "dryRun"),
            count_only: bool_option(body, "countOnly"),
        }
    }
}

fn integer_option(body: &JsonValue, key: &str, default: i64) -> i64 {
    match body.get(key) {
        Some(JsonValue::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(JsonValue::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .unwrap_or(default)
}

fn bool_option(body: &JsonValue, key: &str) -> bool {
    body.get(key).and_then(JsonValue::as_bool).unwrap_or(false)
}
