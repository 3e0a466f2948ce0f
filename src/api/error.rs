//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
///
/// Deliberately small: the analysis endpoint has no failure mode beyond
/// the two client errors — every producer failure is absorbed by the
/// fallback chain before it reaches this layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Uploaded document exceeds the size limit")]
    PayloadTooLarge,
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Comprehension generation failed: {0}")]
    GenerationFailed(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "Uploaded document exceeds the 20 MiB limit".to_string(),
            ),
            ApiError::MissingParameter(name) => (
                StatusCode::BAD_REQUEST,
                "MISSING_PARAMETER",
                format!("Missing required parameter: {name}"),
            ),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::GenerationFailed(detail) => (
                StatusCode::BAD_GATEWAY,
                "GENERATION_FAILED",
                format!("이해도 문제를 생성할 수 없습니다: {detail}"),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}
