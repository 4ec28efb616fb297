use thiserror::Error;

/// Failures while turning raw LLM text into a [`crate::FilterSpec`]
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("LLM response is not valid JSON: {0}")]
    UnparseableJson(#[from] serde_json::Error),

    #[error("LLM response is not a JSON object")]
    NotAnObject,

    #[error("Unexpected value for field '{field}': expected a string")]
    UnexpectedFieldType { field: String },
}
