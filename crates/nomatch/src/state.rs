//! Application state

use nomatch_core::{
    resolve_artifact_store, ArtifactStore, BigQueryClient, QueryExecutor, WorkflowConfig,
};
use std::sync::Arc;

/// Application state shared across command handlers
#[derive(Clone)]
pub struct AppState {
    /// Environment configuration, read once at startup
    pub config: WorkflowConfig,
    /// Warehouse query capability
    pub executor: Arc<dyn QueryExecutor>,
    /// Artifact store selected by the bucket decision table
    pub store: Arc<dyn ArtifactStore>,
}

impl AppState {
    /// Create a new AppState from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = WorkflowConfig::from_env();
        let executor: Arc<dyn QueryExecutor> =
            Arc::new(BigQueryClient::new(&config.query_location));
        let store = resolve_artifact_store(&config.artifact_bucket);

        Ok(Self {
            config,
            executor,
            store,
        })
    }
}
