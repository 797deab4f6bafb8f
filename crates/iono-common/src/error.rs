//! Error types shared by the grid containers.

use thiserror::Error;

/// Raised when flat data does not match the declared grid dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridShapeError {
    #[error("grid data has {actual} values but {rows}x{cols} needs {expected}")]
    LengthMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
        actual: usize,
    },

    #[error("grids differ in shape: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
}
