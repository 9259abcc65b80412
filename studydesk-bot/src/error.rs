//! Bot error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("User not found")]
    UserNotFound,

    #[error("Reference not found")]
    ReferenceNotFound,

    #[error("Reference already submitted: {0}")]
    DuplicateReference(String),

    #[error("Validation error: {0}")]
    Validation(#[from] studydesk_core::Error),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl IntoResponse for BotError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            BotError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            BotError::ReferenceNotFound => {
                (StatusCode::NOT_FOUND, "Reference not found".to_string())
            }
            BotError::DuplicateReference(_) => {
                (StatusCode::CONFLICT, "Reference already submitted".to_string())
            }
            BotError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            BotError::Channel(msg) => {
                tracing::error!("Channel error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Channel error".to_string())
            }
            BotError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = json!({ "success": false, "reason": message });
        (status, axum::Json(body)).into_response()
    }
}
