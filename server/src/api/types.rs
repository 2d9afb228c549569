//! Shared API types
//!
//! Error handling and request validation shared by the JSON endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Maximum run ID length accepted in paths
pub const MAX_ID_LENGTH: usize = 256;

/// Reject run IDs that cannot name a stored run
pub fn validate_run_id(run_id: &str) -> Result<(), ApiError> {
    if run_id.trim().is_empty() {
        return Err(ApiError::bad_request(
            "INVALID_RUN_ID",
            "Run ID must not be empty",
        ));
    }
    if run_id.len() > MAX_ID_LENGTH {
        return Err(ApiError::bad_request(
            "INVALID_RUN_ID",
            format!("Run ID must be at most {} bytes", MAX_ID_LENGTH),
        ));
    }
    Ok(())
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    ServiceUnavailable { message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    pub fn from_data(e: crate::data::DataError) -> Self {
        tracing::error!(error = %e, "Data error");
        if e.is_transient() {
            Self::service_unavailable("Span store is temporarily unavailable")
        } else {
            Self::internal("Database operation failed")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::ServiceUnavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "SERVICE_UNAVAILABLE".to_string(),
                message,
            ),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}
