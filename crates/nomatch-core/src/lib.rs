//! # nomatch-core
//!
//! Core library for the no-match analysis workflow.
//!
//! ## Features
//!
//! - Typed workflow state shared by the step pipeline
//! - Delimited-text rendering/parsing for tabular step output
//! - Artifact store capability with GCS and in-memory backends
//! - Query-execution capability for the conversation-log warehouse
//!
//! ## Example
//!
//! ```no_run
//! use nomatch_core::{resolve_artifact_store, save_csv_artifact, WorkflowConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = WorkflowConfig::from_env();
//!     let store = resolve_artifact_store(&config.artifact_bucket);
//!
//!     let outcome = save_csv_artifact(store.as_ref(), "a,b\n1,2\n", None).await;
//!     println!("Saved: {}", outcome.filename);
//! }
//! ```

pub mod artifacts;
pub mod config;
pub mod csv;
pub mod error;
pub mod query;
pub mod state;

// Re-exports for convenience
pub use artifacts::{
    artifact_metadata, latest_csv_artifact, resolve_artifact_store, save_csv_artifact,
    select_backend,
    ArtifactBackend, ArtifactStore, GcsArtifactStore, InMemoryArtifactStore, LoadedArtifact,
    SaveOutcome, SaveStatus, CSV_ARTIFACT_PREFIX, CSV_CONTENT_TYPE,
};
pub use config::{WorkflowConfig, PLACEHOLDER_BUCKET};
pub use csv::{parse_records, render_records, Record};
pub use error::{Error, Result};
pub use query::{
    fetch_schema_metadata, no_match_query, BigQueryClient, ColumnMetadata, DateWindow,
    QueryExecutor,
};
pub use state::WorkflowState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
