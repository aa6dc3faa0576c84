use thiserror::Error;

/// Errors reading or writing a strategy document
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid strategy document: {0}")]
    Json(#[from] serde_json::Error),
}
