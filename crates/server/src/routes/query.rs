//! Natural-language query HTTP handler

use std::time::Instant;

use axum::{Json, extract::State};
use nlq_core::{
    ExecutionConfig, ExecutionOutcome, ResponseMetadata, ResultEnvelope, build_query,
};
use serde_json::Value as JsonValue;

use crate::AppState;
use crate::ai::translate::translate;
use crate::error::AppError;
use crate::warehouse::run_plan;

/// POST /api/query — Translate a natural-language request and execute it
///
/// The body carries `textInput` plus optional `limit`, `offset`, `dryRun`,
/// and `countOnly`. The response envelope is `{metadata, data, translation}`
/// with mode-specific metadata; dry runs additionally include the generated
/// SQL without executing it.
pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<JsonValue>,
) -> Result<Json<ResultEnvelope>, AppError> {
    let start = Instant::now();

    let Some(text) = body
        .get("textInput")
        .and_then(JsonValue::as_str)
        .filter(|t| !t.trim().is_empty())
    else {
        return Err(AppError::missing_input());
    };

    let config = ExecutionConfig::from_request(&body);
    tracing::info!(
        limit = config.limit,
        offset = config.offset,
        dry_run = config.dry_run,
        count_only = config.count_only,
        "Natural language query received"
    );

    let translation = translate(&state.llm, text)
        .await
        .map_err(|e| e.with_elapsed(start.elapsed().as_millis()))?;

    let plan = build_query(&translation, &config);

    let outcome = run_plan(&state.warehouse, &plan)
        .await
        .map_err(|e| AppError::from(e).with_elapsed(start.elapsed().as_millis()))?;

    let metadata = ResponseMetadata::for_outcome(&outcome, start.elapsed().as_millis());
    let (data, sql) = match outcome {
        ExecutionOutcome::DryRun => (Vec::new(), Some(plan.sql)),
        ExecutionOutcome::Count(_) => (Vec::new(), None),
        ExecutionOutcome::Page(page) => (page.rows, None),
    };

    Ok(Json(ResultEnvelope {
        metadata,
        data,
        translation,
        sql,
    }))
}
