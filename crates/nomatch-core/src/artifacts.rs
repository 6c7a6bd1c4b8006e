//! Artifact storage for generated CSV files
//!
//! Two backends sit behind the [`ArtifactStore`] trait: a durable GCS-backed
//! store and a non-durable in-memory store used for development and tests.
//! Backend selection follows a small decision table on the configured bucket
//! name; see [`select_backend`].

use crate::config::PLACEHOLDER_BUCKET;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Filename prefix for generated training-phrase exports
pub const CSV_ARTIFACT_PREFIX: &str = "dialogflow_cx_training_phrases";

/// Content type attached to saved CSV artifacts
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Artifact store capability: named, versioned, typed blobs
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// List all artifact names
    async fn list(&self) -> Result<Vec<String>>;

    /// Load an artifact; `version` is a zero-based index into the save
    /// history, latest when `None`
    async fn load(&self, name: &str, version: Option<usize>) -> Result<Vec<u8>>;

    /// Save a new version of an artifact
    async fn save(&self, name: &str, data: &[u8], content_type: &str) -> Result<()>;
}

/// Which backend the configuration resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactBackend {
    /// Non-durable, in-process store
    InMemory,
    /// Durable GCS-backed store
    Gcs,
}

/// Backend decision table
///
/// - no bucket configured -> in-memory
/// - bucket equal to the sample-config placeholder -> in-memory
/// - anything else -> GCS
pub fn select_backend(bucket: &str) -> ArtifactBackend {
    if bucket.is_empty() || bucket == PLACEHOLDER_BUCKET {
        ArtifactBackend::InMemory
    } else {
        ArtifactBackend::Gcs
    }
}

/// Build the store the configuration asks for
pub fn resolve_artifact_store(bucket: &str) -> Arc<dyn ArtifactStore> {
    match select_backend(bucket) {
        ArtifactBackend::InMemory => {
            info!("Using in-memory artifact store");
            Arc::new(InMemoryArtifactStore::new())
        }
        ArtifactBackend::Gcs => {
            info!("Using GCS artifact store with bucket: {}", bucket);
            Arc::new(GcsArtifactStore::new(bucket))
        }
    }
}

#[derive(Clone)]
struct StoredArtifact {
    data: Vec<u8>,
    #[allow(dead_code)]
    content_type: String,
}

/// Non-durable in-process artifact store
///
/// Keeps every saved version; names list in lexicographic order.
#[derive(Default)]
pub struct InMemoryArtifactStore {
    artifacts: RwLock<BTreeMap<String, Vec<StoredArtifact>>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn list(&self) -> Result<Vec<String>> {
        let artifacts = self.artifacts.read().await;
        Ok(artifacts.keys().cloned().collect())
    }

    async fn load(&self, name: &str, version: Option<usize>) -> Result<Vec<u8>> {
        let artifacts = self.artifacts.read().await;
        let versions = artifacts
            .get(name)
            .ok_or_else(|| Error::ArtifactNotFound(name.to_string()))?;

        let stored = match version {
            Some(index) => versions.get(index),
            None => versions.last(),
        }
        .ok_or_else(|| Error::ArtifactNotFound(format!("{} (version {:?})", name, version)))?;

        Ok(stored.data.clone())
    }

    async fn save(&self, name: &str, data: &[u8], content_type: &str) -> Result<()> {
        let mut artifacts = self.artifacts.write().await;
        artifacts
            .entry(name.to_string())
            .or_default()
            .push(StoredArtifact {
                data: data.to_vec(),
                content_type: content_type.to_string(),
            });
        debug!("Stored artifact in memory: {}", name);
        Ok(())
    }
}

/// Durable artifact store over the GCS JSON API
///
/// Authentication is a bearer token from `GOOGLE_OAUTH_ACCESS_TOKEN`; the
/// endpoint is overridable for tests. Object names are restricted to the
/// plain filenames this workflow generates.
#[derive(Clone)]
pub struct GcsArtifactStore {
    http: reqwest::Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
}

impl GcsArtifactStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: "https://storage.googleapis.com".to_string(),
            bucket: bucket.into(),
            token: std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN").ok(),
        }
    }

    /// Override the API endpoint (tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<ObjectEntry>,
}

#[derive(Deserialize)]
struct ObjectEntry {
    name: String,
}

#[async_trait]
impl ArtifactStore for GcsArtifactStore {
    async fn list(&self) -> Result<Vec<String>> {
        let url = format!("{}/storage/v1/b/{}/o", self.endpoint, self.bucket);
        let response = self.authed(self.http.get(&url)).send().await?;

        if !response.status().is_success() {
            return Err(Error::Store(format!(
                "list failed ({}) for bucket {}",
                response.status(),
                self.bucket
            )));
        }

        let payload: ListResponse = response.json().await?;
        Ok(payload.items.into_iter().map(|o| o.name).collect())
    }

    async fn load(&self, name: &str, version: Option<usize>) -> Result<Vec<u8>> {
        let mut url = format!(
            "{}/storage/v1/b/{}/o/{}?alt=media",
            self.endpoint, self.bucket, name
        );
        if let Some(generation) = version {
            url.push_str(&format!("&generation={}", generation));
        }

        let response = self.authed(self.http.get(&url)).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::ArtifactNotFound(name.to_string()));
        }
        if !response.status().is_success() {
            return Err(Error::Store(format!(
                "load failed ({}) for {}",
                response.status(),
                name
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn save(&self, name: &str, data: &[u8], content_type: &str) -> Result<()> {
        let url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.endpoint, self.bucket, name
        );

        let response = self
            .authed(self.http.post(&url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Store(format!(
                "save failed ({}) for {}",
                response.status(),
                name
            )));
        }

        debug!("Uploaded artifact to GCS: {}", name);
        Ok(())
    }
}

/// Outcome of a save operation
///
/// Store failures are caught at the call site and reported here; they are
/// never raised to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub status: SaveStatus,
    pub filename: String,
    /// Byte length of the saved content (0 on error)
    pub size: usize,
    pub mime_type: String,
    pub saved_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Success,
    Error,
}

/// Save CSV content as a named, typed artifact
///
/// Generates `dialogflow_cx_training_phrases_<YYYYMMDD_HHMMSS>.csv` when no
/// name is supplied.
pub async fn save_csv_artifact(
    store: &dyn ArtifactStore,
    content: &str,
    filename: Option<&str>,
) -> SaveOutcome {
    let filename = match filename {
        Some(name) => name.to_string(),
        None => format!(
            "{}_{}.csv",
            CSV_ARTIFACT_PREFIX,
            Utc::now().format("%Y%m%d_%H%M%S")
        ),
    };

    let bytes = content.as_bytes();
    match store.save(&filename, bytes, CSV_CONTENT_TYPE).await {
        Ok(()) => {
            info!("Saved CSV artifact: {} ({} bytes)", filename, bytes.len());
            SaveOutcome {
                status: SaveStatus::Success,
                filename,
                size: bytes.len(),
                mime_type: CSV_CONTENT_TYPE.to_string(),
                saved_at: Utc::now(),
                error: None,
            }
        }
        Err(e) => {
            warn!("Error saving CSV artifact {}: {}", filename, e);
            SaveOutcome {
                status: SaveStatus::Error,
                filename,
                size: 0,
                mime_type: CSV_CONTENT_TYPE.to_string(),
                saved_at: Utc::now(),
                error: Some(e.to_string()),
            }
        }
    }
}

/// A loaded artifact with its load timestamp
#[derive(Debug, Clone)]
pub struct LoadedArtifact {
    pub filename: String,
    pub data: Vec<u8>,
    pub loaded_at: DateTime<Utc>,
}

/// Load the most recent CSV artifact whose name contains `pattern`
///
/// List and load failures are downgraded to `None` with a warning.
pub async fn latest_csv_artifact(
    store: &dyn ArtifactStore,
    pattern: &str,
) -> Option<LoadedArtifact> {
    let names = match store.list().await {
        Ok(names) => names,
        Err(e) => {
            warn!("Error listing artifacts: {}", e);
            return None;
        }
    };

    let latest = names
        .into_iter()
        .filter(|name| name.contains(pattern) && name.ends_with(".csv"))
        .last()?;

    match store.load(&latest, None).await {
        Ok(data) => {
            debug!("Loaded artifact: {}", latest);
            Some(LoadedArtifact {
                filename: latest,
                data,
                loaded_at: Utc::now(),
            })
        }
        Err(e) => {
            warn!("Error loading CSV artifact {}: {}", latest, e);
            None
        }
    }
}

/// Size and existence report for a named artifact
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub filename: String,
    pub size: usize,
    pub checked_at: DateTime<Utc>,
}

/// Look up metadata for a named artifact; `None` when absent or on error
pub async fn artifact_metadata(store: &dyn ArtifactStore, name: &str) -> Option<ArtifactInfo> {
    let names = match store.list().await {
        Ok(names) => names,
        Err(e) => {
            warn!("Error listing artifacts: {}", e);
            return None;
        }
    };

    if !names.iter().any(|n| n == name) {
        return None;
    }

    let size = match store.load(name, None).await {
        Ok(data) => data.len(),
        Err(_) => 0,
    };

    Some(ArtifactInfo {
        filename: name.to_string(),
        size,
        checked_at: Utc::now(),
    })
}
