//! Error types for the template layer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while loading or rendering prompt templates
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Template source could not be compiled
    #[error("Failed to parse template '{template}': {reason}")]
    Parse { template: String, reason: String },

    /// Template execution failed (undefined reference, formatting fault)
    #[error("Failed to render template '{template}': {reason}")]
    Render { template: String, reason: String },

    /// Template source file could not be read
    #[error("Failed to read template file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template directory could not be created or listed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid template directory path
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },
}
