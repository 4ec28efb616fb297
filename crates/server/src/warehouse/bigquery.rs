//! BigQuery client for the jobs.query REST endpoint

use async_trait::async_trait;
use nlq_core::{Row, Warehouse, WarehouseError};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

const API_BASE: &str = "https://bigquery.googleapis.com/bigquery/v2/projects";

/// Thin client for synchronous BigQuery query execution.
///
/// Credential provisioning (service accounts, token refresh) is outside this
/// service; the bearer token arrives via configuration. Result cells are
/// passed through as BigQuery returns them (stringly-typed), and consumers
/// treat rows as opaque name→value maps.
#[derive(Clone)]
pub struct BigQueryClient {
    http: reqwest::Client,
    project: String,
    access_token: String,
    location: String,
}

/// Request body for jobs.query
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    location: &'a str,
}

/// Response from jobs.query (the fields we consume)
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    schema: Option<Schema>,
    #[serde(default)]
    rows: Vec<RestRow>,
    job_complete: Option<bool>,
}

#[derive(Deserialize)]
struct Schema {
    fields: Vec<Field>,
}

#[derive(Deserialize)]
struct Field {
    name: String,
}

#[derive(Deserialize)]
struct RestRow {
    f: Vec<Cell>,
}

#[derive(Deserialize)]
struct Cell {
    v: JsonValue,
}

/// Error detail from the API
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl BigQueryClient {
    pub fn new(project: String, access_token: String, location: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            project,
            access_token,
            location,
        }
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>, WarehouseError> {
        let request = QueryRequest {
            query: sql,
            use_legacy_sql: false,
            location: &self.location,
        };

        let url = format!("{API_BASE}/{}/queries", self.project);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| WarehouseError(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if let Ok(api_err) = serde_json::from_str::<ApiError>(&body) {
                return Err(WarehouseError(api_err.error.message));
            }
            return Err(WarehouseError(format!(
                "BigQuery API error ({status}): {body}"
            )));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| WarehouseError(format!("Failed to parse response: {e}")))?;

        if parsed.job_complete == Some(false) {
            // No retry policy anywhere in the pipeline; an incomplete
            // synchronous job surfaces as a timeout-category failure.
            return Err(WarehouseError("Query timeout: job not complete".into()));
        }

        Ok(flatten_rows(parsed))
    }
}

/// Zip schema field names with row cells into ordered name→value maps.
fn flatten_rows(response: QueryResponse) -> Vec<Row> {
    let Some(schema) = response.schema else {
        return Vec::new();
    };

    response
        .rows
        .into_iter()
        .map(|row| {
            schema
                .fields
                .iter()
                .zip(row.f)
                .map(|(field, cell)| (field.name.clone(), cell.v))
                .collect()
        })
        .collect()
}

#[async_trait]
impl Warehouse for BigQueryClient {
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, WarehouseError> {
        self.query(sql).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_schema_and_cells_into_row_maps() {
        let response: QueryResponse = serde_json::from_value(json!({
            "schema": {"fields": [{"name": "PatientID"}, {"name": "Modality"}]},
            "rows": [
                {"f": [{"v": "PID-1"}, {"v": "CT"}]},
                {"f": [{"v": "PID-2"}, {"v": null}]}
            ],
            "jobComplete": true
        }))
        .unwrap();

        let rows = flatten_rows(response);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["PatientID"], json!("PID-1"));
        assert_eq!(rows[0]["Modality"], json!("CT"));
        assert_eq!(rows[1]["Modality"], JsonValue::Null);
    }

    #[test]
    fn missing_schema_yields_no_rows() {
        let response: QueryResponse =
            serde_json::from_value(json!({"jobComplete": true})).unwrap();
        assert!(flatten_rows(response).is_empty());
    }
}
