// ============================
// crates/backend-lib/src/error.rs
// ============================
//! Central error type + Axum integration.
//!
//! The service surfaces exactly these kinds; underlying storage or
//! library failures are folded into `Internal` and their detail is
//! logged, never echoed to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed input; the message names the offending property
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Duplicate unique field; carries which one
    #[error("{field} already exists")]
    Conflict { field: &'static str },

    /// Login failure, uniform across unknown user and wrong password
    #[error("Invalid credentials")]
    Unauthorized,

    /// Admission rejected by the rate limiter
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Hashing/storage/signing failure; detail stays server-side
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::Conflict { .. } => "CONFLICT_001",
            AppError::Unauthorized => "AUTH_001",
            AppError::RateLimited => "RATE_001",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Validation and conflict detail does not aid account enumeration
    /// and passes through; the rest is generic.
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Validation(property) => format!("Invalid input: {property}"),
            AppError::Conflict { field } => format!("{field} already exists"),
            AppError::Unauthorized => "Authentication failed".to_string(),
            AppError::RateLimited => {
                "Too many requests, please try again later".to_string()
            },
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            tracing::error!("internal error: {detail}");
        }

        let status = self.status_code();
        let body = serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.sanitized_message(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_app_error_display() {
        let conflict = AppError::Conflict { field: "username" };
        assert_eq!(conflict.to_string(), "username already exists");

        let validation = AppError::Validation("email".to_string());
        assert_eq!(validation.to_string(), "Invalid input: email");

        assert_eq!(AppError::RateLimited.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::Validation("username".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict { field: "email" }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::RateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_app_error_error_codes() {
        assert_eq!(AppError::Unauthorized.error_code(), "AUTH_001");
        assert_eq!(AppError::RateLimited.error_code(), "RATE_001");
        assert_eq!(
            AppError::Conflict { field: "username" }.error_code(),
            "CONFLICT_001"
        );
        assert_eq!(AppError::Internal("x".to_string()).error_code(), "INT_001");
    }

    #[test]
    fn internal_detail_is_never_surfaced() {
        let err = AppError::Internal("connection refused to db:5432".to_string());
        let message = err.sanitized_message();
        assert!(!message.contains("db:5432"));
        assert_eq!(message, "An internal server error occurred");
    }

    #[test]
    fn test_app_error_into_response() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let headers = response.headers();
        assert!(headers
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("application/json"));
    }
}
