//! Readers for Space Weather Modeling Framework output.
//!
//! - [`ie`]: ionospheric electrodynamics IDL files (`itYYMMDD_HHMMSS_000.idl`,
//!   optionally gzip-compressed), exposed through [`iono_common::IonoFields`].
//! - [`mag_grid`]: ground magnetometer grid snapshots used for AU/AL/AE.

pub mod error;
pub mod ie;
pub mod mag_grid;

pub use error::{SwmfError, SwmfResult};
pub use ie::{iono_time_from_filename, parse_iono, read_iono_file, IonoFile, IonoVariable};
pub use mag_grid::{
    mag_grid_time_from_filename, parse_mag_grid, read_mag_grid, MagGrid, MAG_GRID_HEADER_LINES,
};
