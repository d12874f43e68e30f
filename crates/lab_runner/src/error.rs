//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while talking to the provisioning service.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Stack submission failed for {stack}: {message}")]
    SubmitFailed { stack: String, message: String },

    #[error("Stack status query failed for {stack}: {message}")]
    DescribeFailed { stack: String, message: String },

    #[error("Stack does not exist: {0}")]
    StackNotFound(String),
}

impl RunnerError {
    /// Whether this error means the stack can no longer be described.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::StackNotFound(_))
    }
}
