//! JSON error responses.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use snipshelf_auth::AuthError;
use snipshelf_core::CoreError;
use snipshelf_storage::StorageError;
use snipshelf_util::ErrorKind;
use tracing::{error, warn};

/// Body of every non-2xx API response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    /// The same request may succeed if sent again.
    pub retryable: bool,
    #[serde(skip)]
    status: StatusCode,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            retryable: false,
            status,
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg, "NOT_FOUND")
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg, "BAD_REQUEST")
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg, "INTERNAL_ERROR")
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
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

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match &e {
            CoreError::NotFound { .. } => Self::not_found(e.to_string()),
            // An id that cannot be a storage key names no record.
            CoreError::Storage(StorageError::InvalidKey(_)) => Self::not_found(e.to_string()),
            CoreError::Invalid(inner) if inner.kind() == ErrorKind::MissingField => {
                Self::new(StatusCode::BAD_REQUEST, e.to_string(), "MISSING_FIELD")
            }
            CoreError::Invalid(_) => Self::bad_request(e.to_string()),
            CoreError::AlreadyExists { .. } => {
                Self::new(StatusCode::CONFLICT, e.to_string(), "CONFLICT")
            }
            _ if e.is_retryable() => {
                warn!(error = %e, "Storage unavailable");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "could not save, try again",
                    "STORAGE_UNAVAILABLE",
                )
                .retryable()
            }
            _ => {
                error!(error = %e, "Request failed");
                Self::internal(e.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match &e {
            AuthError::UnknownProvider(_) | AuthError::NotConfigured(_) => {
                Self::not_found(e.to_string())
            }
            AuthError::InvalidState => Self::bad_request(e.to_string()),
            _ if e.is_upstream() => {
                warn!(error = %e, "Identity provider request failed");
                Self::new(StatusCode::BAD_GATEWAY, e.to_string(), "UPSTREAM_ERROR").retryable()
            }
            _ => Self::internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::bad_request(e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self::bad_request(e.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
