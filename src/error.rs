use chrono::NaiveDate;
use thiserror::Error;

/// Unified error type for the entire studypath codebase.
/// All fallible functions return Result<T, SchedError> instead of String errors.
///
/// Callers are expected to branch on the variant: `MissingPlan` and
/// `CorruptState` are recoverable, `InvalidConfiguration` is fatal to the
/// operation that raised it, and `TopicNotFound` is skipped within a batch.
#[derive(Debug, Error)]
pub enum SchedError {
    #[error("no day plan stored for {0}")]
    MissingPlan(NaiveDate),

    #[error("persisted schedule state is unreadable: {0}")]
    CorruptState(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unknown topic id `{0}`")]
    TopicNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SchedError {
    /// Whether the caller can continue after this error without aborting
    /// the surrounding operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SchedError::MissingPlan(_) | SchedError::CorruptState(_) | SchedError::TopicNotFound(_)
        )
    }
}
