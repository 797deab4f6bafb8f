//! Core types for polar grids.

use std::f64::consts::PI;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use iono_common::{FieldGrid, Hemisphere, IonoFields};

use crate::error::{GridError, Result};

/// A satellite current grid in native coordinates, one hemisphere, one epoch.
///
/// Every field is `n_lat x (n_sector + 1)`: the last column is a ghost copy of
/// column 0 that closes the circle for plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarGrid {
    pub hemisphere: Hemisphere,
    pub timestamp: Option<DateTime<Utc>>,
    pub n_lat: usize,
    pub n_sector: usize,
    /// Magnetic latitude, degrees
    pub latitude: FieldGrid,
    /// Magnetic local time, hours (ghost column shifted by `n_sector`)
    pub local_time: FieldGrid,
    /// Radial current density, µA/m²
    pub value: FieldGrid,
}

impl PolarGrid {
    /// Convert to polar plotting coordinates.
    ///
    /// Radius is degrees away from the hemisphere's pole (`90 - lat` in the
    /// north, `90 + lat` in the south); angle is `lt * pi/12 - pi/2` so that
    /// midnight points down.
    pub fn to_axes(&self) -> PolarAxes {
        let radius = match self.hemisphere {
            Hemisphere::North => self.latitude.map(|lat| 90.0 - lat),
            Hemisphere::South => self.latitude.map(|lat| 90.0 + lat),
        };
        let angle = self.local_time.map(|lt| lt * PI / 12.0 - PI / 2.0);

        PolarAxes {
            hemisphere: self.hemisphere,
            timestamp: self.timestamp,
            radius,
            angle,
            value: self.value.clone(),
            ghost_column: true,
        }
    }
}

/// A grid in polar plotting coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarAxes {
    pub hemisphere: Hemisphere,
    pub timestamp: Option<DateTime<Utc>>,
    /// Degrees from the pole
    pub radius: FieldGrid,
    /// Radians
    pub angle: FieldGrid,
    pub value: FieldGrid,
    /// Whether the last column duplicates column 0
    pub ghost_column: bool,
}

impl PolarAxes {
    /// Build from model output: angle `psi * pi/180 + pi/2`, radius `theta`
    /// in the north and `180 - theta` in the south, value `jr`.
    pub fn from_iono<F: IonoFields + ?Sized>(fields: &F, hemisphere: Hemisphere) -> Result<Self> {
        let require = |name: &str| {
            fields
                .field(hemisphere, name)
                .ok_or_else(|| GridError::missing_field(hemisphere, name))
        };
        let theta = require("theta")?;
        let psi = require("psi")?;
        let jr = require("jr")?;
        theta.ensure_same_shape(psi)?;
        theta.ensure_same_shape(jr)?;

        let radius = match hemisphere {
            Hemisphere::North => theta.clone(),
            Hemisphere::South => theta.map(|t| 180.0 - t),
        };

        Ok(Self {
            hemisphere,
            timestamp: fields.time(),
            radius,
            angle: psi.map(|p| p * PI / 180.0 + PI / 2.0),
            value: jr.clone(),
            ghost_column: false,
        })
    }

    /// `(rows, cols)` including any ghost column.
    pub fn shape(&self) -> (usize, usize) {
        self.value.shape()
    }

    /// Columns that represent distinct sectors.
    pub fn physical_columns(&self) -> usize {
        let cols = self.value.cols();
        if self.ghost_column {
            cols.saturating_sub(1)
        } else {
            cols
        }
    }

    /// Clamp values into `[-limit, limit]`. NaN cells are left alone.
    pub fn saturate(&mut self, limit: f64) {
        let limit = limit.abs();
        self.value = self.value.map(|v| if v.is_nan() { v } else { v.clamp(-limit, limit) });
    }

    /// Smallest and largest finite value.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.value.min_max()
    }
}
