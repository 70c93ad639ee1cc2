use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Unknown transform: {0}")]
    UnknownTransform(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{provider}' timed out after {after:?}")]
    Timeout { provider: String, after: Duration },

    #[error("Field not defined: {0}")]
    FieldNotDefined(String),

    #[error("Index {index} out of bounds for collection of {len} items")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::UnknownProvider(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::FieldNotDefined(_)
            | AppError::IndexOutOfBounds { .. }
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Provider(_) | AppError::Timeout { .. } => StatusCode::BAD_GATEWAY,
            AppError::UnknownTransform(_) | AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!("Internal error: {self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
