//! Unified error handling.
//!
//! Provides a unified `AppError` type that maps every failure to the JSON
//! envelope with an opaque message and a stable machine-readable `code`.
//! All route handlers return `Result<T, AppError>`. Raw database and
//! provider errors are logged server-side and never reach the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::payments::PaymentError;

/// Stable error codes exposed in the failure envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationError,
    Unauthorized,
    Forbidden,
    NotFound,
    UpstreamError,
    InternalError,
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Payment gateway operation failed.
    #[error("Payment gateway error: {0}")]
    Payment(#[from] PaymentError),

    /// Token issuance or identity verification failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Malformed or missing input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid session token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but lacking the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure envelope body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    code: ErrorCode,
}

impl AppError {
    /// Error code exposed to clients.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => ErrorCode::NotFound,
            Self::Database(_) | Self::Internal(_) => ErrorCode::InternalError,
            Self::Payment(err) => err.code(),
            Self::Auth(err) => err.code(),
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::Unauthorized(_) => ErrorCode::Unauthorized,
            Self::Forbidden(_) => ErrorCode::Forbidden,
        }
    }

    const fn status(&self) -> StatusCode {
        match self.code() {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Server-side faults get an opaque message;
    /// client faults echo their detail verbatim.
    fn message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Payment(err) => err.client_message(),
            Self::Auth(err) => err.client_message(),
            Self::Validation(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server-side faults with full detail
        match self.code() {
            ErrorCode::InternalError | ErrorCode::UpstreamError => {
                tracing::error!(error = %self, code = ?self.code(), "Request error");
            }
            _ => {
                tracing::debug!(error = %self, code = ?self.code(), "Request rejected");
            }
        }

        let body = ErrorBody {
            success: false,
            message: self.message(),
            code: self.code(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("bad quantity".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthorized("missing token".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("admin only".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::NotFound("order 9".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_internal_message_is_opaque() {
        let err = AppError::Internal("connection pool exhausted at 10.0.0.3".to_string());
        assert_eq!(err.message(), "Internal server error");

        let err = AppError::Database(RepositoryError::DataCorruption("bad row".to_string()));
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_validation_message_is_echoed() {
        let err = AppError::Validation("Invalid product ID or quantity".to_string());
        assert_eq!(err.message(), "Invalid product ID or quantity");
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[test]
    fn test_error_code_serialization() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::ValidationError).unwrap(),
            "\"validation_error\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::UpstreamError).unwrap(),
            "\"upstream_error\""
        );
    }
}
