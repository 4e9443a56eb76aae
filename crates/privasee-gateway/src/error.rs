//! API error types and responses.
//!
//! Every failure is rendered as `{"error": {"code", "message", "details"?}}`.
//! Store and identity failures that are not the caller's fault get an opaque
//! message naming the failed action, with the underlying error in `details`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use privasee_identity::IdentityError;
use privasee_store::StoreError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request body or parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("{message}")]
    Internal {
        /// Opaque description of the failed action.
        message: String,
        /// Underlying failure.
        details: String,
    },

    /// An upstream service failed.
    #[error("{message}")]
    BadGateway {
        /// Opaque description of the failed action.
        message: String,
        /// Underlying failure.
        details: String,
    },
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Error details.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    /// Convert a store failure that happened while performing `action`
    /// (e.g. "create record").
    #[must_use]
    pub fn store(action: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(format!("record {id}")),
            StoreError::ValidationFailed(e) => Self::BadRequest(e.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    action,
                    retriable = other.is_retriable(),
                    "Store error"
                );
                Self::Internal {
                    message: format!("Failed to {action}"),
                    details: other.to_string(),
                }
            }
        }
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadGateway { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Get the error code string for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Internal { .. } => "internal_error",
            Self::BadGateway { .. } => "bad_gateway",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();
        let details = match self {
            Self::Internal { details, .. } | Self::BadGateway { details, .. } => Some(details),
            Self::NotFound(_) | Self::BadRequest(_) => None,
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        tracing::error!(
            error = %err,
            retriable = err.is_retriable(),
            "Identity provider error"
        );
        Self::BadGateway {
            message: "Failed to fetch users".to_string(),
            details: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use privasee_core::{RecordId, ValidationError};

    #[test]
    fn error_status_codes() {
        assert_eq!(
            ApiError::NotFound("test".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadRequest("test".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(IdentityError::RateLimited).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn store_errors_map_by_kind() {
        let id = RecordId::new(9).unwrap();
        assert!(matches!(
            ApiError::store("fetch record", StoreError::NotFound(id)),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::store("create record", ValidationError::EmptyQuestion.into()),
            ApiError::BadRequest(_)
        ));

        let err = ApiError::store("bulk assign records", StoreError::NoMatchingRecords);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to bulk assign records");
    }

    #[test]
    fn error_codes() {
        assert_eq!(ApiError::NotFound("x".into()).code(), "not_found");
        assert_eq!(ApiError::BadRequest("x".into()).code(), "bad_request");
        assert_eq!(
            ApiError::store("delete record", StoreError::Unavailable("down".into())).code(),
            "internal_error"
        );
    }
}
