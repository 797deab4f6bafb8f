//! Polar grids of ionospheric currents and integrated flux quantities.
//!
//! This crate turns satellite (AMPERE) and model (SWMF IE) output into a common
//! polar representation and integrates densities over the ionospheric shell:
//!
//! - **Regridding**: flat latitude-fastest AMPERE records become closed
//!   `n_lat x (n_sector + 1)` grids with a ghost column
//! - **Integration**: net, upward, downward and total field-aligned current
//! - **Precipitation**: number flux and hemispheric power per species
//! - **Indices**: AU/AL/AE from ground magnetic perturbations
//!
//! # Architecture
//!
//! ```text
//! AmpereDataset ──► regrid_record ──► PolarGrid ──► to_axes ──► PolarAxes
//!                                                                  │
//! IonoFields (SWMF) ──► PolarAxes::from_iono ─────────────────────┤
//!        │                                                         ▼
//!        ├──► calc_hemispheric_power                  integrate_axes_current
//!        └──► integrate_iono_current
//! ```
//!
//! # Example
//!
//! ```ignore
//! use polar_grid::{load_ampere_grid, integrate_axes_current, IntegrationConfig};
//!
//! let dataset = ampere_parser::read_ampere_file(path)?;
//! let axes = load_ampere_grid(&dataset, timestamp, Hemisphere::North)?;
//! let totals = integrate_axes_current(&axes, &IntegrationConfig::default())?;
//! println!("{:.3} MA", totals.total);
//! ```

pub mod config;
pub mod error;
pub mod indices;
pub mod integrate;
pub mod precipitation;
pub mod regrid;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{IntegrationConfig, EARTH_RADIUS_KM, IONOSPHERE_ALTITUDE_KM};
pub use error::{GridError, Result};
pub use indices::AuroralIndices;
pub use integrate::{
    integrate_axes_current, integrate_current, integrate_iono_current, CellSelector,
    CurrentTotals, GridSpacing, SurfaceIntegrator,
};
pub use precipitation::{
    calc_hemispheric_power, calc_species_table, HemisphericPower, PrecipitationTotals,
    SpeciesTable,
};
pub use regrid::{load_ampere_grid, regrid_record, COLATITUDE_OFFSET_DEG};
pub use types::{PolarAxes, PolarGrid};
