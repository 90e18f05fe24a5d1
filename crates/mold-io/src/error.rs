//! Error types for STL I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for STL operations.
pub type StlResult<T> = Result<T, StlError>;

/// Errors that can occur reading or writing STL files.
#[derive(Debug, Error)]
pub enum StlError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Invalid file content (parse error).
    #[error("invalid STL content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// The file ended before the declared triangle count was read.
    #[error("truncated STL: expected {expected} triangles, got {got}")]
    Truncated {
        /// Triangle count declared in the header.
        expected: u32,
        /// Triangles actually present.
        got: u32,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Float parsing error in ASCII STL.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}

impl StlError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}
