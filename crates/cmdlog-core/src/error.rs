//! Error types for cmdlog-core

use thiserror::Error;

/// Errors raised while building queries or mutating session state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A required argument was empty or missing
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Field key not present in the registry
    #[error("{0} invalid field name")]
    InvalidField(String),
}
