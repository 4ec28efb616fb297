//! Warehouse execution: BigQuery client and mode dispatch

pub mod bigquery;
pub mod dispatch;

pub use bigquery::BigQueryClient;
pub use dispatch::run_plan;
