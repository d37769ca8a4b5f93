//! Response types and error handling for API endpoints
//!
//! Every failure is answered with `400 Bad Request` and a plain-text body
//! holding the error message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};
use useg_common::AppError;
use useg_core::DomainError;
use useg_service::ServiceError;
use validator::{ValidationErrors, ValidationErrorsKind};

/// API error type for consistent error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Validation(String),

    #[error("JSON reading failed: {0}")]
    UnreadableBody(String),

    #[error("JSON unmarshaling failed: {0}")]
    InvalidBody(String),

    #[error("time limit exceeded")]
    Timeout,

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Get error code for logs
    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Service(e) => e.error_code(),
            Self::Domain(e) => e.code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UnreadableBody(_) => "UNREADABLE_BODY",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::Timeout => "TIMEOUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the server or the store, not the caller, is at fault
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::App(e) => e.is_server_error(),
            Self::Service(e) => e.is_server_error(),
            Self::Domain(e) => e.is_infrastructure(),
            Self::Internal(_) => true,
            Self::Validation(_) | Self::UnreadableBody(_) | Self::InvalidBody(_) | Self::Timeout => false,
        }
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    /// Create a validation error with a custom message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let message = first_message(&errors).unwrap_or_else(|| errors.to_string());
        Self::Validation(message)
    }
}

/// First custom message, preferring the request's own fields over nested ones
fn first_message(errors: &ValidationErrors) -> Option<String> {
    let own = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(ToString::to_string));

    own.or_else(|| {
        errors.errors().values().find_map(|kind| match kind {
            ValidationErrorsKind::Struct(inner) => first_message(inner),
            ValidationErrorsKind::List(items) => items.values().find_map(|inner| first_message(inner)),
            ValidationErrorsKind::Field(_) => None,
        })
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();

        if self.is_server_error() {
            error!(error = ?self, code = self.error_code(), "Server error occurred");
        } else {
            warn!(error = %message, code = self.error_code(), "Request rejected");
        }

        (self.status_code(), message).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::header;
    use useg_core::{SegmentName, UserId};

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_every_error_is_bad_request() {
        assert_eq!(ApiError::Timeout.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(DomainError::DatabaseError("down".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_api_error_codes() {
        assert_eq!(ApiError::Timeout.error_code(), "TIMEOUT");
        assert_eq!(
            ApiError::from(ServiceError::from(DomainError::UserNotFound(UserId::new(1)))).error_code(),
            "UNKNOWN_USER"
        );
    }

    #[tokio::test]
    async fn test_response_is_plain_text_message() {
        let err = ApiError::from(ServiceError::from(DomainError::SegmentNotFound(
            SegmentName::new("vip"),
        )));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/plain"));
        assert_eq!(body_text(response).await, "there is no such segment VIP");
    }

    #[tokio::test]
    async fn test_timeout_message() {
        assert_eq!(body_text(ApiError::Timeout.into_response()).await, "time limit exceeded");
    }

    #[test]
    fn test_nested_validation_message() {
        use useg_service::UserSegmentsRequest;
        use validator::Validate;

        let req: UserSegmentsRequest =
            serde_json::from_str(r#"{"id":7,"segments":[{"name":"vip"},{"name":""}]}"#).unwrap();
        let err = ApiError::from(req.validate().unwrap_err());
        assert_eq!(err.to_string(), "there is no segment");

        let req: UserSegmentsRequest = serde_json::from_str(r#"{"id":0,"segments":[{"name":""}]}"#).unwrap();
        let err = ApiError::from(req.validate().unwrap_err());
        assert_eq!(err.to_string(), "bad request");
    }
}
