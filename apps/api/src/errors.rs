use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::persistence::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Response body is `{ "error": <message>, "code": <code> }`. Server-side
/// variants log their detail and return a generic message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid type")]
    InvalidType,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Database error: {0}")]
    Database(#[from] StoreError),

    #[error("Database unavailable: {0}")]
    DatabaseUnavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidType | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::GenerationFailed(_)
            | AppError::Database(_)
            | AppError::DatabaseUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidType => "invalid_type",
            AppError::Validation(_) => "invalid_request",
            AppError::GenerationFailed(_) => "generation_failed",
            AppError::Database(_) => "database_error",
            AppError::DatabaseUnavailable(_) => "database_unavailable",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::InvalidType => "Invalid type".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::GenerationFailed(msg) => {
                tracing::error!("Generation error: {msg}");
                "Failed to generate letter".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                "A database error occurred".to_string()
            }
            AppError::DatabaseUnavailable(msg) => {
                tracing::error!("Database unavailable: {msg}");
                "Database connection failed".to_string()
            }
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_bad_request() {
        assert_eq!(AppError::InvalidType.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidType.code(), "invalid_type");
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_generation_failure_hides_upstream_detail() {
        let response =
            AppError::GenerationFailed("API error (status 503): upstream secret".into())
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_store_error_converts_to_database_error() {
        let err: AppError = StoreError::Query("relation does not exist".into()).into();
        assert_eq!(err.code(), "database_error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
