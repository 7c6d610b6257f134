//! Error types for the RTAB engine
//!
//! Three failure families matter to callers: configuration problems surfaced
//! at construction, remote API failures during a fetch cycle, and catalog
//! access before a cycle has completed. None of them are retried here; the
//! caller decides whether to run another cycle.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Error type for the RTAB engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration document is missing, malformed, or inconsistent
    #[error("Configuration error: {0}. Check the settings file and the selected environment.")]
    Config(String),

    /// Remote record store answered with a non-success status
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// Catalog was queried before any fetch cycle completed
    #[error("State error: {0}. Run a fetch cycle first.")]
    State(String),

    /// HTTP transport failed before a status was received
    #[error("Network request failed: {0}. Check your connection and the configured base URL.")]
    Http(#[from] reqwest::Error),

    /// Response or configuration JSON could not be parsed
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// File system operation failed
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API error from a response status and verbatim body
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Create a state error
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }
}
