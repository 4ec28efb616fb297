//! Response envelope and metadata shaping

use serde::Serialize;

use crate::FilterSpec;
use crate::traits::Row;

/// What execution produced, by mode. The dispatcher builds one of these;
/// the formatter turns it into caller-facing metadata.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// Nothing was executed.
    DryRun,
    /// Resolved total from the count-wrapped query.
    Count(i64),
    /// One page of rows with pagination state.
    Page(PageResult),
}

/// Paginated execution result, already truncated to the requested limit.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub rows: Vec<Row>,
    pub has_more: bool,
    pub limit: i64,
    pub offset: i64,
}

/// Mode-specific response metadata.
///
/// The three shapes are mutually exclusive: a count-only response never
/// carries `limit`/`offset`/`hasMore`, and a paginated response never
/// carries `totalCount`. Absent fields are a contract, not an omission —
/// consumers branch on the mode rather than probing generically.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Wall-clock time for the whole request, e.g. `"213ms"`.
    pub execution_time: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_returned: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

impl ResponseMetadata {
    /// Format metadata for an execution outcome and elapsed request time.
    pub fn for_outcome(outcome: &ExecutionOutcome, elapsed_ms: u128) -> Self {
        let base = Self {
            execution_time: format!("{elapsed_ms}ms"),
            dry_run: None,
            count_only: None,
            total_count: None,
            rows_returned: None,
            limit: None,
            offset: None,
            has_more: None,
        };

        match outcome {
            ExecutionOutcome::DryRun => Self {
                dry_run: Some(true),
                ..base
            },
            ExecutionOutcome::Count(total) => Self {
                count_only: Some(true),
                total_count: Some(*total),
                ..base
            },
            ExecutionOutcome::Page(page) => Self {
                rows_returned: Some(page.rows.len()),
                limit: Some(page.limit),
                offset: Some(page.offset),
                has_more: Some(page.has_more),
                ..base
            },
        }
    }
}

/// The uniform response envelope across all three modes.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEnvelope {
    pub metadata: ResponseMetadata,
    /// Result rows; empty for dry-run and count-only responses.
    pub data: Vec<Row>,
    /// The normalized translation, echoed for caller display.
    pub translation: FilterSpec,
    /// The generated SQL, included for dry runs only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}
