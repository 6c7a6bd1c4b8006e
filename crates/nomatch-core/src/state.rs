//! Workflow state threaded through the step pipeline
//!
//! One typed field per workflow key, every field initialized empty before any
//! step runs. Each step overwrites exactly one designated field; the
//! orchestrator gates on that field staying empty.

use crate::config::WorkflowConfig;
use crate::query::{fetch_schema_metadata, ColumnMetadata, QueryExecutor};
use serde::{Deserialize, Serialize};
use tracing::info;

/// State for one workflow invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Warehouse project identifier
    pub project_id: String,
    /// Query-service location
    pub query_location: String,
    /// Dataset holding the conversation export
    pub dataset_name: String,
    /// Configured artifact bucket (may be empty or a placeholder)
    pub artifact_bucket: String,
    /// Columns of the queryable tables, seeded at initialization
    pub schema_metadata: Vec<ColumnMetadata>,

    /// What the caller is asking for; drives the retrieval date window
    pub pending_query: String,
    /// Exported bot configuration, when the caller supplies one
    pub bot_config_document: String,

    /// Transcripts of conversations with no-match events (retrieval step)
    pub retrieval_result: String,
    /// Patterns-and-recommendations report (analysis step)
    pub analysis_result: String,
    /// Bot structure inventory (structure-parsing step; set only when a
    /// config document was supplied)
    pub structure_analysis_result: String,
    /// Completion descriptor for the saved artifact (generation step)
    pub artifact_result: String,
}

impl WorkflowState {
    /// Initialize state from configuration, seeding schema metadata
    ///
    /// Introspection failure is downgraded inside [`fetch_schema_metadata`];
    /// the workflow proceeds with an empty metadata list.
    pub async fn initialize(config: &WorkflowConfig, executor: &dyn QueryExecutor) -> Self {
        let schema_metadata = fetch_schema_metadata(
            executor,
            &config.project_id,
            &config.query_location,
            &config.dataset_name,
        )
        .await;

        info!(
            "Initialized workflow state: project={}, dataset={}, {} schema columns",
            config.project_id,
            config.dataset_name,
            schema_metadata.len()
        );

        Self {
            project_id: config.project_id.clone(),
            query_location: config.query_location.clone(),
            dataset_name: config.dataset_name.clone(),
            artifact_bucket: config.artifact_bucket.clone(),
            schema_metadata,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::Record;
    use crate::{Error, Result};
    use async_trait::async_trait;

    struct FailingExecutor;

    #[async_trait]
    impl QueryExecutor for FailingExecutor {
        async fn execute(&self, _project: &str, _sql: &str) -> Result<Vec<Record>> {
            Err(Error::Query("auth failure".to_string()))
        }
    }

    #[test]
    fn test_default_state_is_all_empty() {
        let state = WorkflowState::default();
        assert!(state.retrieval_result.is_empty());
        assert!(state.analysis_result.is_empty());
        assert!(state.structure_analysis_result.is_empty());
        assert!(state.artifact_result.is_empty());
        assert!(state.schema_metadata.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_downgrades_introspection_failure() {
        let config = WorkflowConfig {
            project_id: "demo".to_string(),
            query_location: "us-central1".to_string(),
            dataset_name: "dialogflow_export".to_string(),
            artifact_bucket: String::new(),
        };

        let state = WorkflowState::initialize(&config, &FailingExecutor).await;

        assert_eq!(state.project_id, "demo");
        assert_eq!(state.dataset_name, "dialogflow_export");
        assert!(state.schema_metadata.is_empty());
        assert!(state.pending_query.is_empty());
    }
}
