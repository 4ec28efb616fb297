//! LLM response normalization into a [`FilterSpec`]

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::TranslateError;

const FENCE_PREFIX: &str = "```json\n";
const FENCE_SUFFIX: &str = "```\n";

/// Normalized structured translation of a natural-language query.
///
/// Invariant: every field is either a non-empty string or `None` — never an
/// empty string. Multi-valued fields returned by the LLM collapse to their
/// first element; multi-value filters are a known simplification, not a
/// supported feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Boolean SQL predicate over the `metadata` JSON column. Trusted
    /// verbatim in query construction; absent means "match nothing".
    pub where_clause: Option<String>,

    /// Keyword phrase for text-embedding similarity search.
    pub text_search: Option<String>,

    /// Keyword phrase for image-embedding similarity search.
    pub image_search: Option<String>,

    /// Human-readable explanation of the translation, echoed to the caller
    /// and never used in query construction.
    pub notes: Option<String>,
}

impl FilterSpec {
    /// Parse and normalize a raw LLM response into a `FilterSpec`.
    ///
    /// Strips a markdown code fence if present, parses the remainder as a
    /// JSON object, and normalizes every field: empty string or empty array
    /// becomes absent, a non-empty array collapses to its first element.
    pub fn from_llm_text(raw: &str) -> Result<Self, TranslateError> {
        let unfenced = strip_code_fence(raw);
        let parsed: JsonValue = serde_json::from_str(unfenced)?;

        let JsonValue::Object(mut fields) = parsed else {
            return Err(TranslateError::NotAnObject);
        };

        Ok(Self {
            where_clause: take_field(&mut fields, "whereClause")?,
            text_search: take_field(&mut fields, "textSearch")?,
            image_search: take_field(&mut fields, "imageSearch")?,
            notes: take_field(&mut fields, "notes")?,
        })
    }

    /// The single phrase used for the vector-similarity join, if any.
    /// Text search wins when both embedding fields are present.
    pub fn vector_phrase(&self) -> Option<&str> {
        self.text_search.as_deref().or(self.image_search.as_deref())
    }
}

/// Remove the markdown fence wrapper if present.
///
/// This is a fixed-length prefix/suffix trim, not a general scan: it assumes
/// the closing fence is exactly the trailing characters of the text. A
/// response that opens a fence but closes it differently will fail JSON
/// parsing downstream rather than being rescued here.
fn strip_code_fence(text: &str) -> &str {
    let Some(body) = text.strip_prefix(FENCE_PREFIX) else {
        return text;
    };
    let end = body.len().saturating_sub(FENCE_SUFFIX.len());
    body.get(..end).unwrap_or(body)
}

/// Remove `key` from the object and normalize it to an optional string.
fn take_field(
    fields: &mut serde_json::Map<String, JsonValue>,
    key: &str,
) -> Result<Option<String>, TranslateError> {
    let Some(value) = fields.remove(key) else {
        return Ok(None);
    };

    match normalize_value(value) {
        None => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(_) => Err(TranslateError::UnexpectedFieldType {
            field: key.to_string(),
        }),
    }
}

/// Collapse a field value: null, empty string, and empty array become
/// absent; a non-empty array yields its (normalized) first element.
fn normalize_value(value: JsonValue) -> Option<JsonValue> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) if s.is_empty() => None,
        JsonValue::Array(items) => items.into_iter().next().and_then(normalize_value),
        other => Some(other),
    }
}
