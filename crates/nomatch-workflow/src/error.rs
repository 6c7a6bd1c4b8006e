//! Error types for nomatch-workflow

use thiserror::Error;

/// Result type for nomatch-workflow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for nomatch-workflow
#[derive(Error, Debug)]
pub enum Error {
    /// Agent error from llm-toolkit
    #[error("Agent error: {0}")]
    Agent(#[from] llm_toolkit::agent::AgentError),

    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] nomatch_core::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

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
