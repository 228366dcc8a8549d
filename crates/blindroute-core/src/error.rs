//! Error types for the blindroute core.

use thiserror::Error;

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by gateways, upstream clients and the reservation store.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// True for failures that are worth retrying on the next natural tick (network, 5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            CoreError::Http(_) => true,
            CoreError::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
