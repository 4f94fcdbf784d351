//! Error types for cmdlog-client

use thiserror::Error;

/// Errors that can occur when talking to the search endpoint
#[derive(Error, Debug)]
pub enum ClientError {
    /// Invalid client configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Could not reach the endpoint
    #[error("Connection failed: {0}")]
    Connection(String),

    /// No reply within the configured timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Any other HTTP level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request body could not be serialized
    #[error("Failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// Reply was not a search response
    #[error("Failed to decode response (status {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}
