//! Domain error types.
//!
//! Every failure surfaced to a client is a (message, status code) pair. The
//! transport layer maps these onto its error response unchanged.

use thiserror::Error;

/// Errors produced by validation, authorization and app binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Malformed payload or missing required field/identifier (400).
    #[error("{message}")]
    BadRequest { message: String },

    /// Authorization key missing or not matching a protected app (401).
    #[error("{message}")]
    Unauthorized { message: String },

    /// Mandatory resolution of an app that does not exist (404).
    #[error("{message}")]
    NotFound { message: String },

    /// Opaque failure from the storage or upgrade collaborator (500).
    #[error("{message}")]
    Upstream { message: String },
}

impl DomainError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Not-found error naming the missing app.
    pub fn app_not_found(app_id: &str) -> Self {
        Self::not_found(format!("app not found: {app_id}"))
    }

    /// Numeric status code carried with the message.
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::BadRequest { .. } => 400,
            DomainError::Unauthorized { .. } => 401,
            DomainError::NotFound { .. } => 404,
            DomainError::Upstream { .. } => 500,
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        match self {
            DomainError::BadRequest { message }
            | DomainError::Unauthorized { message }
            | DomainError::NotFound { message }
            | DomainError::Upstream { message } => message,
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(DomainError::bad_request("x").status_code(), 400);
        assert_eq!(DomainError::unauthorized("x").status_code(), 401);
        assert_eq!(DomainError::not_found("x").status_code(), 404);
        assert_eq!(DomainError::upstream("x").status_code(), 500);
    }

    #[test]
    fn test_app_not_found_names_the_app() {
        let err = DomainError::app_not_found("app-42");
        assert_eq!(err.message(), "app not found: app-42");
        assert_eq!(err.to_string(), "app not found: app-42");
    }
}
