//! # nomatch-workflow
//!
//! LLM-powered step pipeline for no-match analysis.
//!
//! ## Features
//!
//! - Four workflow steps: retrieval, analysis, structure parsing, CSV generation
//! - Orchestrator state machine with empty-result gates
//! - Progress-event relay from steps to the caller
//!
//! ## Example
//!
//! ```no_run
//! use nomatch_workflow::{EventSink, Orchestrator};
//! use nomatch_core::{resolve_artifact_store, BigQueryClient, WorkflowConfig, WorkflowState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> nomatch_workflow::Result<()> {
//!     let config = WorkflowConfig::from_env();
//!     let executor = Arc::new(BigQueryClient::new(&config.query_location));
//!     let store = resolve_artifact_store(&config.artifact_bucket);
//!
//!     let mut state = WorkflowState::initialize(&config, executor.as_ref()).await;
//!     state.pending_query = "no-match events from last week".to_string();
//!
//!     let (sink, _events) = EventSink::channel();
//!     let orchestrator = Orchestrator::with_services(executor, store, sink);
//!
//!     let phase = orchestrator.run(&mut state).await?;
//!     println!("Workflow finished: {}", phase);
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod prompts;
pub mod steps;

// Re-exports
pub use agents::{
    AnalysisReportResponse, BotStructureAgent, BotStructureResponse, DateWindowAgent,
    DateWindowResponse, NoMatchAnalysisAgent, TrainingPhraseAgent, TrainingPhraseResponse,
    TrainingPhraseRow,
};
pub use error::{Error, Result};
pub use events::{EventSink, StepEvent};
pub use orchestrator::{Orchestrator, WorkflowPhase};
pub use steps::{
    rows_to_records, AnalysisStep, CsvGenerationStep, RetrievalStep, StructureParsingStep,
    WorkflowStep, TRAINING_PHRASE_COLUMNS,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
