//! Application error handling
//!
//! Every failure is local to one request and surfaces as a structured body
//! `{error, message, details?, executionTime?}` with a machine-readable
//! category. There are no retries anywhere in the pipeline.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nlq_core::{LlmError, TranslateError, WarehouseError};
use serde::Serialize;

/// Application error type
#[derive(Debug)]
pub enum ErrorKind {
    /// Natural-language text absent from the request; nothing downstream ran.
    MissingInput,
    /// The LLM call itself failed (transport, auth, provider error).
    LlmUnavailable(String),
    /// The LLM's text could not be unwrapped/parsed into a translation.
    MalformedLlmResponse(String),
    /// The warehouse rejected or failed the assembled query; classified by
    /// message substring when rendered.
    Warehouse(String),
}

/// An error plus the elapsed request time at the point of failure.
#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    elapsed_ms: Option<u128>,
}

/// Serialized error body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution_time: Option<String>,
}

impl AppError {
    pub fn missing_input() -> Self {
        Self {
            kind: ErrorKind::MissingInput,
            elapsed_ms: None,
        }
    }

    /// Attach the elapsed request time, rendered as `executionTime`.
    pub fn with_elapsed(mut self, elapsed_ms: u128) -> Self {
        self.elapsed_ms = Some(elapsed_ms);
        self
    }
}

impl From<ErrorKind> for AppError {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            elapsed_ms: None,
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        ErrorKind::LlmUnavailable(err.0).into()
    }
}

impl From<TranslateError> for AppError {
    fn from(err: TranslateError) -> Self {
        ErrorKind::MalformedLlmResponse(err.to_string()).into()
    }
}

impl From<WarehouseError> for AppError {
    fn from(err: WarehouseError) -> Self {
        ErrorKind::Warehouse(err.0).into()
    }
}

/// Heuristic category for a warehouse failure, by provider-message substring.
pub fn classify_warehouse_error(message: &str) -> &'static str {
    if message.contains("Syntax error") {
        "INVALID_SQL"
    } else if message.contains("Not found") {
        "NOT_FOUND"
    } else if message.to_lowercase().contains("timeout") {
        "TIMEOUT"
    } else {
        "UNKNOWN_ERROR"
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let execution_time = self.elapsed_ms.map(|ms| format!("{ms}ms"));

        let (status, error, message, details) = match self.kind {
            ErrorKind::MissingInput => (
                StatusCode::BAD_REQUEST,
                "MISSING_INPUT",
                "textInput is required.".to_string(),
                None,
            ),
            ErrorKind::LlmUnavailable(details) => (
                StatusCode::BAD_GATEWAY,
                "TRANSLATION_FAILED",
                "Failed to generate query from natural language input.".to_string(),
                Some(details),
            ),
            ErrorKind::MalformedLlmResponse(details) => (
                StatusCode::BAD_GATEWAY,
                "MALFORMED_LLM_RESPONSE",
                "Failed to generate query from natural language input.".to_string(),
                Some(details),
            ),
            ErrorKind::Warehouse(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                classify_warehouse_error(&details),
                "Failed to execute query.".to_string(),
                Some(details),
            ),
        };

        let body = ErrorBody {
            error,
            message,
            details,
            execution_time,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warehouse_messages_are_classified_by_substring() {
        assert_eq!(
            classify_warehouse_error("Syntax error: Unexpected keyword AT [4:3]"),
            "INVALID_SQL"
        );
        assert_eq!(
            classify_warehouse_error("Not found: Table dicom.metadataView"),
            "NOT_FOUND"
        );
        assert_eq!(
            classify_warehouse_error("Operation timed out after query timeout"),
            "TIMEOUT"
        );
        assert_eq!(classify_warehouse_error("quota exceeded"), "UNKNOWN_ERROR");
    }
}
