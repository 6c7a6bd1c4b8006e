//! Error types for nomatch-core

use thiserror::Error;

/// Result type for nomatch-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for nomatch-core
#[derive(Error, Debug)]
pub enum Error {
    /// Query execution error
    #[error("Query error: {0}")]
    Query(String),

    /// Artifact store error
    #[error("Artifact store error: {0}")]
    Store(String),

    /// Artifact not found
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited text
    #[error("Malformed CSV: {0}")]
    MalformedCsv(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
