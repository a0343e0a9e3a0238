use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::routes::api_headers;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Underlying cause, omitted in production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("External service error: {message}")]
    ExternalServiceError {
        message: String,
        details: Option<String>,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::ExternalServiceError { message, details } => {
                (StatusCode::BAD_GATEWAY, message, details)
            }
        };

        (
            status,
            api_headers(),
            axum::Json(ErrorResponse { error, details }),
        )
            .into_response()
    }
}
