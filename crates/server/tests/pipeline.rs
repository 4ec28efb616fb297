//! Pipeline tests exercising translation and execution dispatch against
//! in-memory collaborator fakes.
//!
//! Both external collaborators are remote SaaS endpoints, so the test seam
//! is the core trait pair rather than a container: a scripted language model
//! and a recording warehouse stand in for Gemini and BigQuery.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use nlq_core::{
    ExecutionConfig, ExecutionOutcome, LanguageModel, LlmError, Row, Warehouse, WarehouseError,
    build_query,
};
use nlq_server::ai::translate::translate;
use nlq_server::warehouse::run_plan;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Language model that always answers with a fixed script.
struct ScriptedModel {
    response: String,
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok(self.response.clone())
    }
}

/// Warehouse that records every executed query and replays canned rows.
struct RecordingWarehouse {
    rows: Vec<Row>,
    calls: AtomicUsize,
    last_sql: Mutex<Option<String>>,
}

impl RecordingWarehouse {
    fn returning(rows: Vec<Row>) -> Self {
        Self {
            rows,
            calls: AtomicUsize::new(0),
            last_sql: Mutex::new(None),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Warehouse for RecordingWarehouse {
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, WarehouseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_sql.lock().unwrap() = Some(sql.to_string());
        Ok(self.rows.clone())
    }
}

/// Warehouse that always fails with the given provider message.
struct FailingWarehouse(&'static str);

#[async_trait]
impl Warehouse for FailingWarehouse {
    async fn execute(&self, _sql: &str) -> Result<Vec<Row>, WarehouseError> {
        Err(WarehouseError(self.0.to_string()))
    }
}

fn patient_row(i: usize) -> Row {
    let mut row = Row::new();
    row.insert("PatientID".to_string(), json!(format!("PID-{i}")));
    row.insert("Modality".to_string(), json!("CT"));
    row
}

fn filter(where_clause: &str) -> nlq_core::FilterSpec {
    nlq_core::FilterSpec {
        where_clause: Some(where_clause.to_string()),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dry_run_never_invokes_the_warehouse() {
    let warehouse = RecordingWarehouse::returning(vec![patient_row(1)]);
    let config = ExecutionConfig {
        dry_run: true,
        ..Default::default()
    };
    let plan = build_query(&filter("TRUE"), &config);

    let outcome = run_plan(&warehouse, &plan).await.unwrap();

    assert!(matches!(outcome, ExecutionOutcome::DryRun));
    assert_eq!(warehouse.call_count(), 0);
    assert!(!plan.sql.is_empty(), "dry run still produces the SQL text");
}

#[tokio::test]
async fn full_page_plus_one_sets_has_more_and_truncates_in_order() {
    let rows: Vec<Row> = (0..6).map(patient_row).collect();
    let warehouse = RecordingWarehouse::returning(rows);
    let config = ExecutionConfig {
        limit: 5,
        ..Default::default()
    };
    let plan = build_query(&filter("TRUE"), &config);

    let outcome = run_plan(&warehouse, &plan).await.unwrap();
    let ExecutionOutcome::Page(page) = outcome else {
        panic!("expected a paginated outcome");
    };

    assert!(page.has_more);
    assert_eq!(page.rows.len(), 5);
    assert_eq!(page.rows[0]["PatientID"], json!("PID-0"));
    assert_eq!(page.rows[4]["PatientID"], json!("PID-4"));
    assert_eq!(warehouse.call_count(), 1);
}

#[tokio::test]
async fn exactly_limit_rows_means_no_more() {
    let rows: Vec<Row> = (0..5).map(patient_row).collect();
    let warehouse = RecordingWarehouse::returning(rows);
    let config = ExecutionConfig {
        limit: 5,
        offset: 20,
        ..Default::default()
    };
    let plan = build_query(&filter("TRUE"), &config);

    let outcome = run_plan(&warehouse, &plan).await.unwrap();
    let ExecutionOutcome::Page(page) = outcome else {
        panic!("expected a paginated outcome");
    };

    assert!(!page.has_more);
    assert_eq!(page.rows.len(), 5);
    assert_eq!(page.offset, 20);
}

#[tokio::test]
async fn count_only_resolves_the_total() {
    let mut row = Row::new();
    row.insert("totalCount".to_string(), json!("321"));
    let warehouse = RecordingWarehouse::returning(vec![row]);
    let config = ExecutionConfig {
        count_only: true,
        ..Default::default()
    };
    let plan = build_query(&filter("TRUE"), &config);

    let outcome = run_plan(&warehouse, &plan).await.unwrap();

    assert!(matches!(outcome, ExecutionOutcome::Count(321)));
    let sql = warehouse.last_sql.lock().unwrap().clone().unwrap();
    assert!(sql.starts_with("SELECT COUNT(*)"));
}

#[tokio::test]
async fn warehouse_failures_propagate_unmodified() {
    let warehouse = FailingWarehouse("Syntax error: Unexpected keyword AT [4:3]");
    let plan = build_query(&filter("TRUE"), &ExecutionConfig::default());

    let err = run_plan(&warehouse, &plan).await.unwrap_err();
    assert_eq!(err.0, "Syntax error: Unexpected keyword AT [4:3]");
}

// ---------------------------------------------------------------------------
// Translation through to SQL
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fenced_llm_response_translates_and_executes() {
    let llm = ScriptedModel {
        response: "```json\n{\"whereClause\":\"SAFE_CAST(JSON_VALUE(meta.metadata, '$.PatientAge') AS INT64) BETWEEN 30 AND 50\",\"textSearch\":\"emphysema\",\"imageSearch\":\"\",\"notes\":\"age range plus finding\"}\n```\n"
            .to_string(),
    };
    let warehouse = RecordingWarehouse::returning(vec![patient_row(1)]);

    let spec = translate(&llm, "female patients between 30 and 50 with emphysema")
        .await
        .unwrap();
    assert_eq!(spec.image_search, None);
    assert_eq!(spec.notes.as_deref(), Some("age range plus finding"));

    let plan = build_query(&spec, &ExecutionConfig::default());
    run_plan(&warehouse, &plan).await.unwrap();

    let sql = warehouse.last_sql.lock().unwrap().clone().unwrap();
    assert!(sql.contains("BETWEEN 30 AND 50"));
    assert!(sql.contains("LEFT JOIN VECTOR_SEARCH"));
    assert!(sql.contains("'emphysema'"));
    assert!(sql.contains("ORDER BY VectorSearchDistance ASC"));
    assert!(sql.contains("LIMIT 51 OFFSET 0"));
}

#[tokio::test]
async fn unparseable_llm_response_aborts_before_any_query() {
    let llm = ScriptedModel {
        response: "Sure! Here is the query you asked for:".to_string(),
    };

    let result = translate(&llm, "find everything").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn empty_translation_produces_a_fail_safe_query() {
    let llm = ScriptedModel {
        response: json!({
            "whereClause": "",
            "textSearch": "",
            "imageSearch": [],
            "notes": "could not map the request"
        })
        .to_string(),
    };
    let warehouse = RecordingWarehouse::returning(Vec::new());

    let spec = translate(&llm, "gibberish input").await.unwrap();
    let plan = build_query(&spec, &ExecutionConfig::default());
    let outcome = run_plan(&warehouse, &plan).await.unwrap();

    let ExecutionOutcome::Page(page) = outcome else {
        panic!("expected a paginated outcome");
    };
    assert!(page.rows.is_empty());

    let sql = warehouse.last_sql.lock().unwrap().clone().unwrap();
    assert!(sql.contains("WHERE FALSE"), "empty filter must match nothing");
    assert!(!sql.contains("VECTOR_SEARCH"));
}
