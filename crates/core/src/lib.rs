//! nlq-core: Natural-language DICOM query pipeline
//!
//! This crate holds the pure query-generation pipeline: prompt construction,
//! LLM response normalization, SQL assembly, and response metadata shaping.
//! It performs no I/O; the two external collaborators (LLM and warehouse)
//! are expressed as async traits that the server crate implements.

pub mod error;
pub mod filter;
pub mod metadata;
pub mod prompt;
pub mod query;
pub mod request;
pub mod traits;

pub use error::TranslateError;
pub use filter::FilterSpec;
pub use metadata::{ExecutionOutcome, PageResult, ResponseMetadata, ResultEnvelope};
pub use prompt::generate_prompt;
pub use query::{QueryMode, QueryPlan, build_query};
pub use request::ExecutionConfig;
pub use traits::{LanguageModel, LlmError, Row, Warehouse, WarehouseError};
