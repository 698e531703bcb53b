//! Error types for the backend module

use std::time::Duration;
use thiserror::Error;

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Backend module errors
#[derive(Debug, Error)]
pub enum BackendError {
    /// Backend request payload could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Backend could not be reached (connection refused, DNS failure, ...)
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Backend did not answer within the configured deadline
    #[error("Backend request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Backend answered with a non-success status
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Backend response body is not a JSON object
    #[error("Invalid backend response: {0}")]
    Decode(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
