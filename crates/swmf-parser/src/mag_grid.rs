//! SWMF magnetometer grid output (`mag_grid_eYYYYMMDD-HHMMSS.out`).
//!
//! Four header lines, then one row per virtual station:
//! `lon lat dBn dBe dBd ...`. Only the northward perturbation `dBn` (third
//! column, nT) is kept; it feeds the auroral electrojet indices.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

use crate::error::{SwmfError, SwmfResult};

/// Lines preceding the station rows.
pub const MAG_GRID_HEADER_LINES: usize = 4;

/// Northward ground perturbations of one magnetometer grid snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct MagGrid {
    /// `dBn` per station, file order
    pub dbn: Vec<f64>,
}

impl MagGrid {
    pub fn len(&self) -> usize {
        self.dbn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dbn.is_empty()
    }
}

/// Parse magnetometer grid text.
pub fn parse_mag_grid(text: &str) -> SwmfResult<MagGrid> {
    let mut lines = text.lines().enumerate();

    for _ in 0..MAG_GRID_HEADER_LINES {
        if lines.next().is_none() {
            return Err(SwmfError::MissingSection(format!(
                "{}-line header",
                MAG_GRID_HEADER_LINES
            )));
        }
    }

    let mut dbn = Vec::new();
    for (index, line) in lines {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let column = line
            .split_whitespace()
            .nth(2)
            .ok_or_else(|| SwmfError::invalid(line_no, "expected at least 3 columns"))?;
        let value = column
            .parse::<f64>()
            .map_err(|_| SwmfError::invalid(line_no, format!("not a number: '{}'", column)))?;
        dbn.push(value);
    }

    Ok(MagGrid { dbn })
}

/// Read a magnetometer grid file.
pub fn read_mag_grid<P: AsRef<Path>>(path: P) -> SwmfResult<MagGrid> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let grid = parse_mag_grid(&text)?;
    debug!(file = %path.display(), stations = grid.len(), "Loaded magnetometer grid");
    Ok(grid)
}

/// Snapshot time encoded in a magnetometer grid filename.
pub fn mag_grid_time_from_filename<P: AsRef<Path>>(path: P) -> Option<DateTime<Utc>> {
    let filename = path.as_ref().file_name()?.to_str()?;
    let stamp = filename.strip_prefix("mag_grid_e")?.strip_suffix(".out")?;
    let naive = NaiveDateTime::parse_from_str(stamp, "%Y%m%d-%H%M%S").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}
