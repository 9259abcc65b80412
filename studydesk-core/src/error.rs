//! Error types for studydesk-core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid subject code: {0}")]
    InvalidSubjectCode(String),

    #[error("Subject name must be 3-100 characters")]
    InvalidSubjectName,

    #[error("Unit must be a number between 1 and 6")]
    InvalidUnit,

    #[error("Unknown resource type: {0}")]
    UnknownResourceKind(String),

    #[error("Link must start with http:// or https://")]
    InvalidLink,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
