use thiserror::Error;

/// Errors raised by the data model shared between the parser boundary and
/// the diff core. The diff core's own pipeline (`diffcore::diff_blocks`) is
/// total and never returns this type; it exists for callers validating
/// configuration or block input before invoking the pipeline.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, ModelError>;
