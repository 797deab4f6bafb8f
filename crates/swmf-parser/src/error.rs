//! Error types for SWMF output parsing.

use thiserror::Error;

/// Result type for SWMF parser operations.
pub type SwmfResult<T> = Result<T, SwmfError>;

#[derive(Error, Debug)]
pub enum SwmfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A required header section is absent
    #[error("Missing section: {0}")]
    MissingSection(String),

    /// Malformed content at a 1-based line number
    #[error("Invalid format at line {line}: {message}")]
    InvalidFormat { line: usize, message: String },

    /// A header field inside a section is absent
    #[error("Missing field: {0}")]
    MissingField(String),
}

impl SwmfError {
    pub fn invalid(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            line,
            message: message.into(),
        }
    }
}
