//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use appbase_core::error::{AppError, ErrorKind};

const CREDENTIAL_MESSAGE: &str = "Missing or invalid credentials";
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Handler and middleware error. Wraps `AppError` so it can become a response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error kind.
    pub fn status(&self) -> StatusCode {
        status_for(self.0.kind)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthorized | ErrorKind::InvalidCredential => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Expired => StatusCode::GONE,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Database
        | ErrorKind::Configuration
        | ErrorKind::ExternalService
        | ErrorKind::Serialization
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.kind);

        let (code, message) = if err.kind.is_authentication() {
            tracing::debug!(kind = %err.kind, reason = %err.message, "Credential rejected");
            ("UNAUTHORIZED".to_string(), CREDENTIAL_MESSAGE.to_string())
        } else if err.kind.is_client_visible() {
            (err.kind.to_string(), err.message)
        } else {
            tracing::error!(kind = %err.kind, error = %err, "Request failed");
            ("INTERNAL_ERROR".to_string(), INTERNAL_MESSAGE.to_string())
        };

        let body = ApiErrorResponse {
            error: code,
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::InvalidCredential), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::Expired), StatusCode::GONE);
        assert_eq!(status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(
            status_for(ErrorKind::ExternalService),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_credential_failures_share_one_message() {
        let a = ApiError(AppError::unauthorized("API key required")).into_response();
        let b = ApiError(AppError::invalid_credential("bad signature")).into_response();
        assert_eq!(a.status(), b.status());
        assert_eq!(a.status(), StatusCode::UNAUTHORIZED);
    }
}
