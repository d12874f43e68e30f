//! Error types for templates.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while loading or materializing templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template asset not found: {0}")]
    NotFound(PathBuf),

    #[error("Cannot resolve template asset root: {0}")]
    AssetRoot(String),

    #[error("Failed to read template asset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
