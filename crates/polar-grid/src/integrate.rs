//! Spherical-surface integration of ionospheric flux densities.
//!
//! A density `f` sampled on a colatitude / longitude grid integrates to
//!
//! ```text
//! unit * R^2 * sum(f * sin(theta) * dTheta * dPhi)
//! ```
//!
//! over the selected cells, with `R` the radius of the ionospheric shell.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use iono_common::{FieldGrid, Hemisphere, IonoFields};

use crate::config::IntegrationConfig;
use crate::error::{GridError, Result};
use crate::types::PolarAxes;

/// Elementary charge, C
pub const ELEMENTARY_CHARGE: f64 = 1.6e-19;

/// µA/m² over m² to MA
pub const MICROAMP_TO_MEGAAMP: f64 = 1e-12;

/// W to GW
pub const WATT_TO_GIGAWATT: f64 = 1e-9;

/// cm⁻² to m⁻²
pub const PER_CM2_TO_PER_M2: f64 = 1e4;

/// µA to A, used for current-driven number flux
pub const MICRO: f64 = 1e-6;

/// Angular cell size, radians, always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpacing {
    pub d_theta: f64,
    pub d_phi: f64,
}

impl GridSpacing {
    /// Spacing from degree steps.
    pub fn from_degrees(d_theta_deg: f64, d_phi_deg: f64) -> Self {
        Self {
            d_theta: d_theta_deg.to_radians().abs(),
            d_phi: d_phi_deg.to_radians().abs(),
        }
    }

    /// Spacing of model output, from the northern grid:
    /// `dlon = psi[0,3] - psi[0,2]`, `dlat = theta[3,0] - theta[2,0]`.
    pub fn from_iono<F: IonoFields + ?Sized>(fields: &F) -> Result<Self> {
        let hemisphere = Hemisphere::North;
        let theta = fields
            .field(hemisphere, "theta")
            .ok_or_else(|| GridError::missing_field(hemisphere, "theta"))?;
        let psi = fields
            .field(hemisphere, "psi")
            .ok_or_else(|| GridError::missing_field(hemisphere, "psi"))?;

        let (rows, cols) = psi.shape();
        if theta.rows() < 4 || cols < 4 || rows == 0 || theta.cols() == 0 {
            return Err(GridError::invalid_spacing(format!(
                "need at least 4 x 4 points, model grid is {} x {}",
                theta.rows(),
                cols
            )));
        }

        let dlon = diff(psi, (0, 3), (0, 2))?;
        let dlat = diff(theta, (3, 0), (2, 0))?;
        Self::from_degrees(dlat, dlon).validated()
    }

    /// Spacing of an AMPERE grid: `d_phi = 2 pi / n_sector` over the physical
    /// columns, `d_theta` from the radius step between rings 2 and 3 (rings 0
    /// and 1 on smaller grids).
    pub fn from_axes(axes: &PolarAxes) -> Result<Self> {
        let rows = axes.radius.rows();
        let n_sector = axes.physical_columns();
        if rows < 2 || n_sector == 0 {
            return Err(GridError::invalid_spacing(format!(
                "need at least 2 rings and 1 sector, grid is {} x {}",
                rows, n_sector
            )));
        }

        let d_theta_deg = if rows >= 4 {
            diff(&axes.radius, (3, 0), (2, 0))?
        } else {
            diff(&axes.radius, (1, 0), (0, 0))?
        };

        Self {
            d_theta: d_theta_deg.to_radians().abs(),
            d_phi: 2.0 * std::f64::consts::PI / n_sector as f64,
        }
        .validated()
    }

    fn validated(self) -> Result<Self> {
        if !(self.d_theta > 0.0 && self.d_theta.is_finite())
            || !(self.d_phi > 0.0 && self.d_phi.is_finite())
        {
            return Err(GridError::invalid_spacing(format!(
                "degenerate spacing d_theta={} d_phi={}",
                self.d_theta, self.d_phi
            )));
        }
        Ok(self)
    }
}

fn diff(grid: &FieldGrid, a: (usize, usize), b: (usize, usize)) -> Result<f64> {
    match (grid.get(a.0, a.1), grid.get(b.0, b.1)) {
        (Some(x), Some(y)) => Ok(x - y),
        _ => Err(GridError::invalid_spacing(format!(
            "cells {:?} / {:?} outside {:?} grid",
            a,
            b,
            grid.shape()
        ))),
    }
}

/// Which cells contribute to a sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSelector {
    /// Every cell, signed
    All,
    /// Cells with positive density
    Positive,
    /// Cells with negative density
    Negative,
    /// Every cell, absolute integrand
    Absolute,
}

impl CellSelector {
    fn contribution(&self, density: f64, integrand: f64) -> f64 {
        match self {
            CellSelector::All => integrand,
            CellSelector::Positive if density > 0.0 => integrand,
            CellSelector::Negative if density < 0.0 => integrand,
            CellSelector::Absolute => integrand.abs(),
            _ => 0.0,
        }
    }
}

/// Sums densities over the ionospheric shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceIntegrator {
    pub spacing: GridSpacing,
    /// Shell radius, metres
    pub radius_m: f64,
}

impl SurfaceIntegrator {
    pub fn new(spacing: GridSpacing, radius_m: f64) -> Self {
        Self { spacing, radius_m }
    }

    pub fn with_config(spacing: GridSpacing, config: &IntegrationConfig) -> Self {
        Self::new(spacing, config.radius_m())
    }

    /// `unit * R^2 * sum(f * sin(colat) * dTheta * dPhi)` over the cells picked
    /// by `selector`.
    ///
    /// Non-finite cells are skipped with a warning; a grid with no finite cell
    /// at all is an `EmptyGrid` error rather than a zero total.
    pub fn integrate(
        &self,
        density: &FieldGrid,
        colat_deg: &FieldGrid,
        unit: f64,
        selector: CellSelector,
    ) -> Result<f64> {
        if density.is_empty() {
            return Err(GridError::empty_grid("no cells to integrate"));
        }
        density.ensure_same_shape(colat_deg)?;

        let cell = self.spacing.d_theta * self.spacing.d_phi;
        let mut finite = 0usize;
        let mut sum = 0.0;
        for (f, colat) in density.iter().zip(colat_deg.iter()) {
            if f.is_finite() && colat.is_finite() {
                finite += 1;
                sum += selector.contribution(f, f * colat.to_radians().sin() * cell);
            }
        }

        let skipped = density.len() - finite;
        if finite == 0 {
            return Err(GridError::empty_grid(format!(
                "all {} cells are non-finite",
                skipped
            )));
        }
        if skipped > 0 {
            warn!(skipped, cells = density.len(), "Skipped non-finite cells");
        }

        Ok(unit * self.radius_m * self.radius_m * sum)
    }
}

/// Integrated field-aligned current, MA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentTotals {
    /// Signed sum over all cells
    pub net: f64,
    /// Sum over cells with `jr > 0`
    pub upward: f64,
    /// Sum over cells with `jr < 0` (non-positive)
    pub downward: f64,
    /// Half the absolute sum
    pub total: f64,
}

/// Net, upward, downward and total current of a `jr` grid (µA/m²).
pub fn integrate_current(
    integrator: &SurfaceIntegrator,
    jr: &FieldGrid,
    colat_deg: &FieldGrid,
) -> Result<CurrentTotals> {
    let unit = MICROAMP_TO_MEGAAMP;
    Ok(CurrentTotals {
        net: integrator.integrate(jr, colat_deg, unit, CellSelector::All)?,
        upward: integrator.integrate(jr, colat_deg, unit, CellSelector::Positive)?,
        downward: integrator.integrate(jr, colat_deg, unit, CellSelector::Negative)?,
        total: 0.5 * integrator.integrate(jr, colat_deg, unit, CellSelector::Absolute)?,
    })
}

/// Integrated current of a polar grid, using the radius as colatitude.
///
/// A ghost column is excluded so every sector counts once.
pub fn integrate_axes_current(axes: &PolarAxes, config: &IntegrationConfig) -> Result<CurrentTotals> {
    let spacing = GridSpacing::from_axes(axes)?;
    let integrator = SurfaceIntegrator::with_config(spacing, config);

    let cols = axes.physical_columns();
    let jr = axes.value.leading_columns(cols);
    let colat = axes.radius.leading_columns(cols);

    let totals = integrate_current(&integrator, &jr, &colat)?;
    debug!(
        hemisphere = %axes.hemisphere,
        total = totals.total,
        "Integrated grid current"
    );
    Ok(totals)
}

/// Integrated current of one hemisphere of model output.
pub fn integrate_iono_current<F: IonoFields + ?Sized>(
    fields: &F,
    hemisphere: Hemisphere,
    config: &IntegrationConfig,
) -> Result<CurrentTotals> {
    let spacing = GridSpacing::from_iono(fields)?;
    let integrator = SurfaceIntegrator::with_config(spacing, config);

    let theta = fields
        .field(hemisphere, "theta")
        .ok_or_else(|| GridError::missing_field(hemisphere, "theta"))?;
    let jr = fields
        .field(hemisphere, "jr")
        .ok_or_else(|| GridError::missing_field(hemisphere, "jr"))?;

    integrate_current(&integrator, jr, theta)
}
