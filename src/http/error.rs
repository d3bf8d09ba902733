//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{AuthFailure, Error};

/// Error body: `{"code": ..., "message": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// Errors a handler can return.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::BadRequest(m)
            | Self::ServiceUnavailable(m)
            | Self::Internal(m) => m,
        }
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let message = err.user_message();
        match err {
            Error::Authorization(failure) if failure.is_unauthenticated() => {
                Self::Unauthorized(message)
            },
            Error::Authorization(_) => Self::Forbidden(message),
            Error::NotFound(_) => Self::NotFound(message),
            Error::InvalidSelector(_) => Self::BadRequest(message),
            Error::CompressionUnavailable(_) => Self::ServiceUnavailable(message),
            other => {
                error!(error = %other, "Request failed");
                Self::Internal(message)
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404_with_user_text() {
        let err: AppError = Error::NotFound("/srv/uploads/x.zip".into()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "File not found or not readable.");
    }

    #[test]
    fn test_authorization_status_by_failure() {
        let missing: AppError = Error::Authorization(AuthFailure::MissingToken).into();
        assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);
        let nonce: AppError = Error::Authorization(AuthFailure::NonceRejected).into();
        assert_eq!(nonce.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(nonce.message(), "Security check failed");
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err: AppError = Error::DataStore("no such table: wp_comments".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Database error");
    }
}
