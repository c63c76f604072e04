//! Error types for the nodata library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for nodata operations.
#[derive(Debug, Error)]
pub enum NodataError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File extension or output format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The loader could not interpret the file contents.
    #[error("Parse error in '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    /// An action was triggered before the step it depends on.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Format/geometry mismatch or write failure during export.
    #[error("Export error for '{path}': {message}")]
    Export { path: PathBuf, message: String },

    /// Diagnostic rendering failed or is not applicable.
    #[error("Visualization error: {0}")]
    Visualization(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NodataError {
    /// Build a parse error for `path`.
    pub fn parse(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        NodataError::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Build an export error for `path`.
    pub fn export(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        NodataError::Export {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Informational errors are reported as a note; the session stays usable.
    pub fn is_informational(&self) -> bool {
        matches!(self, NodataError::Visualization(_))
    }
}

/// Result type alias for nodata operations.
pub type Result<T> = std::result::Result<T, NodataError>;
