//! Dense 2-D grids of physical quantities.

use serde::{Deserialize, Serialize};

use crate::error::GridShapeError;

/// Ordering of a flat buffer relative to its (row, column) indices.
///
/// Satellite and model files store their rings latitude-fastest, i.e. in
/// column-major order, while `FieldGrid` keeps row-major storage internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanOrder {
    /// `index = i * cols + j`
    RowMajor,
    /// `index = i + j * rows`
    ColumnMajor,
}

impl ScanOrder {
    /// Calculate flat array index from 2D indices.
    pub fn flat_index(&self, i: usize, j: usize, rows: usize, cols: usize) -> usize {
        match self {
            ScanOrder::RowMajor => i * cols + j,
            ScanOrder::ColumnMajor => i + j * rows,
        }
    }
}

/// A rectangular grid of `f64` values, `rows x cols`, stored row-major.
///
/// Rows index latitude rings and columns index local-time sectors throughout
/// the workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGrid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl FieldGrid {
    /// Create a grid filled with `fill`.
    pub fn filled(rows: usize, cols: usize, fill: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![fill; rows * cols],
        }
    }

    /// Create a zero-filled grid.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// Wrap row-major data.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, GridShapeError> {
        Self::from_flat(rows, cols, data, ScanOrder::RowMajor)
    }

    /// Wrap latitude-fastest (`i + j*rows`) data.
    pub fn from_fortran_order(
        rows: usize,
        cols: usize,
        data: Vec<f64>,
    ) -> Result<Self, GridShapeError> {
        Self::from_flat(rows, cols, data, ScanOrder::ColumnMajor)
    }

    /// Build a grid from flat data in the given scan order.
    pub fn from_flat(
        rows: usize,
        cols: usize,
        data: Vec<f64>,
        order: ScanOrder,
    ) -> Result<Self, GridShapeError> {
        let expected = rows * cols;
        if data.len() != expected {
            return Err(GridShapeError::LengthMismatch {
                rows,
                cols,
                expected,
                actual: data.len(),
            });
        }

        if order == ScanOrder::RowMajor {
            return Ok(Self { rows, cols, data });
        }

        let mut grid = Self::zeros(rows, cols);
        for j in 0..cols {
            for i in 0..rows {
                grid.data[i * cols + j] = data[order.flat_index(i, j, rows, cols)];
            }
        }
        Ok(grid)
    }

    /// Build a grid from nested rows. All rows must share a length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, GridShapeError> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(GridShapeError::LengthMismatch {
                    rows: rows.len(),
                    cols,
                    expected: rows.len() * cols,
                    actual: data.len() + row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Value at ring `i`, sector `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.rows || j >= self.cols {
            return None;
        }
        self.data.get(i * self.cols + j).copied()
    }

    /// Overwrite the value at ring `i`, sector `j`. Out-of-range writes are ignored.
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        if i < self.rows && j < self.cols {
            self.data[i * self.cols + j] = value;
        }
    }

    /// One latitude ring.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.rows {
            return None;
        }
        Some(&self.data[i * self.cols..(i + 1) * self.cols])
    }

    /// Row-major view of all values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().copied()
    }

    /// Apply `f` to every value.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two equally shaped grids cell by cell.
    pub fn zip_map(
        &self,
        other: &FieldGrid,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Self, GridShapeError> {
        self.ensure_same_shape(other)?;
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Fail unless `other` has the same shape.
    pub fn ensure_same_shape(&self, other: &FieldGrid) -> Result<(), GridShapeError> {
        if self.shape() != other.shape() {
            return Err(GridShapeError::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(())
    }

    /// Copy of the grid restricted to the first `cols` columns.
    pub fn leading_columns(&self, cols: usize) -> Self {
        let cols = cols.min(self.cols);
        let mut data = Vec::with_capacity(self.rows * cols);
        for i in 0..self.rows {
            data.extend_from_slice(&self.data[i * self.cols..i * self.cols + cols]);
        }
        Self {
            rows: self.rows,
            cols,
            data,
        }
    }

    /// Smallest and largest finite values, if any.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
