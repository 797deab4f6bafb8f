//! Filename conventions of the input products.

use chrono::{DateTime, Utc};

use crate::hemisphere::Hemisphere;

/// AMPERE grid file for an event starting at `start`, e.g.
/// `20110926.1000.86400.120.north.grd.ncdf`.
pub fn ampere_filename(
    start: DateTime<Utc>,
    span_secs: u32,
    cadence_secs: u32,
    hemisphere: Hemisphere,
) -> String {
    format!(
        "{}.{}.{}.{}.grd.ncdf",
        start.format("%Y%m%d.%H%M"),
        span_secs,
        cadence_secs,
        hemisphere
    )
}

/// SWMF IE output for `time`, e.g. `it110926_140800_000.idl`.
///
/// The year is written with two digits.
pub fn iono_filename(time: DateTime<Utc>) -> String {
    format!("it{}_000.idl", time.format("%y%m%d_%H%M%S"))
}

/// SWMF magnetometer grid output for `time`, e.g.
/// `mag_grid_e20100404-220000.out`.
pub fn mag_grid_filename(time: DateTime<Utc>) -> String {
    format!("mag_grid_e{}.out", time.format("%Y%m%d-%H%M%S"))
}
