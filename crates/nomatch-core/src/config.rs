//! Environment configuration for the workflow
//!
//! Four values are read once at startup: the warehouse project, query
//! location, dataset name, and the artifact bucket. Missing variables become
//! empty strings; the bucket decision table in [`crate::artifacts`] routes an
//! empty or placeholder bucket to the in-memory store.

use serde::{Deserialize, Serialize};

/// Bucket value shipped in sample configs; treated the same as "unset"
pub const PLACEHOLDER_BUCKET: &str = "your-no-match-analysis-artifacts";

/// Connection parameters for the query and artifact services
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Warehouse project identifier (`PROJECT`)
    pub project_id: String,
    /// Query-service location, e.g. `us-central1` (`BQ_LOCATION`)
    pub query_location: String,
    /// Dataset holding the conversation export (`DATASET`)
    pub dataset_name: String,
    /// Artifact bucket name (`GCS_BUCKET_NAME`); empty or placeholder selects
    /// the in-memory store
    pub artifact_bucket: String,
}

impl WorkflowConfig {
    /// Read configuration from the environment
    pub fn from_env() -> Self {
        Self {
            project_id: env_or_empty("PROJECT"),
            query_location: env_or_empty("BQ_LOCATION"),
            dataset_name: env_or_empty("DATASET"),
            artifact_bucket: env_or_empty("GCS_BUCKET_NAME"),
        }
    }
}

fn env_or_empty(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env mutation is process-global; tests touching it must hold this lock
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_is_empty() {
        let config = WorkflowConfig::default();
        assert!(config.project_id.is_empty());
        assert!(config.artifact_bucket.is_empty());
    }

    #[test]
    fn test_from_env_reads_values() {
        let _guard = ENV_LOCK.lock().unwrap();

        // Set all four so the test is independent of the ambient environment
        std::env::set_var("PROJECT", "demo-project");
        std::env::set_var("BQ_LOCATION", "us-central1");
        std::env::set_var("DATASET", "dialogflow_export");
        std::env::set_var("GCS_BUCKET_NAME", "demo-bucket");

        let config = WorkflowConfig::from_env();
        assert_eq!(config.project_id, "demo-project");
        assert_eq!(config.query_location, "us-central1");
        assert_eq!(config.dataset_name, "dialogflow_export");
        assert_eq!(config.artifact_bucket, "demo-bucket");
    }
}
