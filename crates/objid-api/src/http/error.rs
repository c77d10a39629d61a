//! Error responses.
//!
//! Every failure leaves the API as `{"code": "...", "message": "..."}` with
//! the matching status. Upstream and storage details are logged, never sent.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use objid_domain::DomainError;
use objid_storage::StorageError;

/// Machine-readable values of the `code` field.
pub mod error_codes {
    /// Schema violation, bad JSON or unusable app id (400).
    pub const VALIDATION_ERROR: &str = "validation_error";
    /// Missing or wrong authorization key (401).
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const APP_NOT_FOUND: &str = "app_not_found";
    pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";
    /// Storage backend unreachable (503).
    pub const SERVICE_UNAVAILABLE: &str = "service_unavailable";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error_codes::UNAUTHORIZED, message)
    }

    pub fn app_not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error_codes::APP_NOT_FOUND, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            error_codes::PAYLOAD_TOO_LARGE,
            message,
        )
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::SERVICE_UNAVAILABLE,
            message,
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            message,
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::BadRequest { message } => Self::validation_error(message),
            DomainError::Unauthorized { message } => Self::unauthorized(message),
            DomainError::NotFound { message } => Self::app_not_found(message),
            DomainError::Upstream { message } => {
                error!(%message, "upstream failure");
                Self::internal_error("internal error")
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidPath { message } => Self::validation_error(message),
            down @ StorageError::ConnectionError { .. } => {
                error!(error = %down, "storage unavailable");
                Self::service_unavailable("storage backend unavailable")
            }
            other => {
                error!(error = %other, "storage failure");
                Self::internal_error("internal storage error")
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
