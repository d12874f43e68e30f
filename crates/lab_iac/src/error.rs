//! Error types for IaC module.

use thiserror::Error;

use crate::lifecycle::Operation;

/// Result type alias for IaC operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur while preparing or driving a stack operation.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("Invalid deploy options: {0}")]
    Validation(String),

    #[error("Malformed tag {tag:?}: {reason}")]
    MalformedTag { tag: String, reason: String },

    #[error("Duplicate stack parameter: {0}")]
    DuplicateParameter(String),

    #[error("Random source failure: {0}")]
    RandomSource(String),

    #[error("Stack not found: {0}")]
    StackNotFound(String),

    #[error("{}", failure_message(.operation, .status, .reason.as_deref()))]
    OperationFailed {
        operation: Operation,
        status: String,
        reason: Option<String>,
    },

    #[error("Timed out after {waited:?} waiting for stack {stack}")]
    Timeout {
        stack: String,
        waited: std::time::Duration,
    },

    #[error("Stack operation cancelled while waiting for {0}")]
    Cancelled(String),

    #[error("Runner error: {0}")]
    Runner(#[from] lab_runner::RunnerError),
}

fn failure_message(operation: &Operation, status: &str, reason: Option<&str>) -> String {
    let base = match operation {
        Operation::Create => "stack creation failed",
        Operation::Delete => "stack delete failed",
    };
    match reason {
        Some(reason) => format!("{} ({}: {})", base, status, reason),
        None => format!("{} ({})", base, status),
    }
}
