use thiserror::Error;

/// All errors that can occur in dupesift-core.
///
/// Data-quality problems (missing titles and the like) are not errors; they
/// are reported as [`crate::types::Warning`]s and the run continues. An error
/// here aborts the run.
#[derive(Debug, Error)]
pub enum DupesiftError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("duplicate item id in input: {0}")]
    DuplicateItemId(String),

    /// Programming-error class fault, distinct from data-quality warnings.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    #[error("report serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DupesiftError>;
