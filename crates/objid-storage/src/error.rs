//! Storage error types.

use thiserror::Error;

/// Storage-specific errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The blob changed between read and update.
    #[error("version conflict at {path}: expected {expected:?}, found {actual:?}")]
    VersionConflict {
        path: String,
        expected: Option<u64>,
        actual: Option<u64>,
    },

    /// The blob path is malformed.
    #[error("invalid blob path: {message}")]
    InvalidPath { message: String },

    /// Serialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },

    /// Backend unavailable.
    #[error("storage connection error: {message}")]
    ConnectionError { message: String },

    /// Internal error.
    #[error("internal storage error: {message}")]
    InternalError { message: String },
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError {
            message: err.to_string(),
        }
    }
}

/// Result of a backend health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub backend: &'static str,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
