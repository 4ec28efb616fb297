//! Execution-mode dispatch

use nlq_core::{
    ExecutionOutcome, PageResult, QueryMode, QueryPlan, Row, Warehouse, WarehouseError,
};
use serde_json::Value as JsonValue;

/// Execute a query plan according to its mode.
///
/// Dry runs return immediately and never touch the warehouse. Count queries
/// coerce the single result cell to a number, falling back to 0 on any
/// unexpected shape rather than failing. Paginated queries were built with
/// `LIMIT limit+1`; the extra row, if present, becomes the `hasMore` flag
/// and is truncated away. Warehouse failures propagate unmodified.
pub async fn run_plan<W: Warehouse>(
    warehouse: &W,
    plan: &QueryPlan,
) -> Result<ExecutionOutcome, WarehouseError> {
    match plan.mode {
        QueryMode::DryRun => Ok(ExecutionOutcome::DryRun),

        QueryMode::CountOnly => {
            let rows = warehouse.execute(&plan.sql).await?;
            Ok(ExecutionOutcome::Count(extract_count(&rows)))
        }

        QueryMode::Paginated { limit, offset } => {
            let mut rows = warehouse.execute(&plan.sql).await?;
            let has_more = rows.len() as i64 > limit;
            rows.truncate(limit as usize);
            Ok(ExecutionOutcome::Page(PageResult {
                rows,
                has_more,
                limit,
                offset,
            }))
        }
    }
}

/// Pull the total from a count-query result set.
///
/// BigQuery names the column `totalCount` per our wrapper, but an anonymous
/// aggregate arrives as `f0_`; REST cells may also be stringly-typed.
fn extract_count(rows: &[Row]) -> i64 {
    let Some(first) = rows.first() else {
        return 0;
    };

    match first.get("totalCount").or_else(|| first.get("f0_")) {
        Some(JsonValue::Number(n)) => n.as_i64().unwrap_or(0),
        Some(JsonValue::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}
