//! Error types for regridding and integration.

use ampere_parser::AmpereError;
use chrono::{DateTime, Utc};
use iono_common::{GridShapeError, Hemisphere};
use thiserror::Error;

/// Errors that can occur while building or integrating polar grids.
#[derive(Error, Debug)]
pub enum GridError {
    /// The grid has no cells.
    #[error("empty grid: {0}")]
    EmptyGrid(String),

    /// Two grids that must align do not.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Cell spacing cannot be derived or is not usable.
    #[error("invalid grid spacing: {0}")]
    InvalidSpacing(String),

    /// A model field required by a calculation is absent.
    #[error("missing field '{field}' for {hemisphere} hemisphere")]
    MissingField {
        hemisphere: Hemisphere,
        field: String,
    },

    /// No epoch carries exactly the requested timestamp.
    #[error("no epoch at {timestamp} in {file}")]
    TimestampNotFound {
        timestamp: DateTime<Utc>,
        file: String,
    },

    /// Failure reading the satellite source.
    #[error("AMPERE source error: {0}")]
    Source(#[source] AmpereError),
}

impl GridError {
    /// Create an EmptyGrid error.
    pub fn empty_grid(msg: impl Into<String>) -> Self {
        Self::EmptyGrid(msg.into())
    }

    /// Create an InvalidSpacing error.
    pub fn invalid_spacing(msg: impl Into<String>) -> Self {
        Self::InvalidSpacing(msg.into())
    }

    /// Create a MissingField error.
    pub fn missing_field(hemisphere: Hemisphere, field: impl Into<String>) -> Self {
        Self::MissingField {
            hemisphere,
            field: field.into(),
        }
    }

    /// Whether the failure is an absent input file, which batch callers skip
    /// rather than report.
    pub fn is_missing_input(&self) -> bool {
        matches!(
            self,
            Self::Source(AmpereError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound
        )
    }
}

impl From<AmpereError> for GridError {
    fn from(err: AmpereError) -> Self {
        match err {
            AmpereError::TimestampNotFound { timestamp, file } => {
                Self::TimestampNotFound { timestamp, file }
            }
            other => Self::Source(other),
        }
    }
}

impl From<GridShapeError> for GridError {
    fn from(err: GridShapeError) -> Self {
        Self::ShapeMismatch(err.to_string())
    }
}

/// Result type for polar grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
