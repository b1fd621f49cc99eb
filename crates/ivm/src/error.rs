use crate::validator::ValidationIssue;
use thiserror::Error;

/// Raised by [`assert_valid`](crate::assert_valid) when a graph has errors
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub errors: Vec<ValidationIssue>,
}

#[derive(Error, Debug)]
pub enum IvmError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, IvmError>;
