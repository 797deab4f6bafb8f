//! Error types for AMPERE file parsing.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for AMPERE parser operations.
pub type AmpereResult<T> = Result<T, AmpereError>;

/// Error types for AMPERE parsing.
#[derive(Error, Debug)]
pub enum AmpereError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Missing required variable or dimension
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// No epoch in the file carries exactly the requested timestamp
    #[error("no epoch at {timestamp} in {file}")]
    TimestampNotFound {
        timestamp: DateTime<Utc>,
        file: String,
    },

    /// Per-epoch arrays do not match `nlat * nlon`
    #[error("{field} has {actual} values per epoch, expected {expected}")]
    ShapeMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },
}

impl From<netcdf::Error> for AmpereError {
    fn from(err: netcdf::Error) -> Self {
        Self::InvalidFormat(err.to_string())
    }
}
