//! Native netCDF loading using the netcdf library.
//!
//! AMPERE grid files carry one record per epoch along the unlimited time
//! dimension:
//!
//! ```text
//! nlat(time), nlon(time)                      grid size (constant over the file)
//! start_yr/mo/dy/hr/mt(time)                  epoch start
//! colat(time, nlat*nlon)                      colatitude, degrees
//! mlt(time, nlat*nlon)                        magnetic local time, hours
//! Jr(time, nlat*nlon)                         radial current density, µA/m²
//! ```
//!
//! libnetcdf converts integer storage to the requested element type, so every
//! variable is read as `f64` or `i32` regardless of how it was written.

use std::path::Path;
use std::sync::Once;

use tracing::{debug, info};

use crate::dataset::{AmpereDataset, EpochFields};
use crate::error::{AmpereError, AmpereResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when probing for optional
/// variables). This disables that output by calling H5Eset_auto2 with null
/// handlers. Safe to call more than once.
///
/// Call this early in `main()` before any netCDF operation.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Read a whole AMPERE grid file into memory.
pub fn read_ampere_file<P: AsRef<Path>>(path: P) -> AmpereResult<AmpereDataset> {
    silence_hdf5_errors();

    let path = path.as_ref();
    if !path.exists() {
        return Err(AmpereError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let source = path.display().to_string();
    let nc_file = netcdf::open(path)
        .map_err(|e| AmpereError::InvalidFormat(format!("Failed to open {}: {}", source, e)))?;

    let nlat = first_count(&nc_file, "nlat")?;
    let nlon = first_count(&nc_file, "nlon")?;

    let years = read_i32(&nc_file, "start_yr")?;
    let months = read_i32(&nc_file, "start_mo")?;
    let days = read_i32(&nc_file, "start_dy")?;
    let hours = read_i32(&nc_file, "start_hr")?;
    let minutes = read_i32(&nc_file, "start_mt")?;

    let nepochs = years.len();
    for (name, values) in [
        ("start_mo", &months),
        ("start_dy", &days),
        ("start_hr", &hours),
        ("start_mt", &minutes),
    ] {
        if values.len() != nepochs {
            return Err(AmpereError::InvalidFormat(format!(
                "{} has {} epochs, start_yr has {}",
                name,
                values.len(),
                nepochs
            )));
        }
    }

    let mut epochs = Vec::with_capacity(nepochs);
    for t in 0..nepochs {
        epochs.push(EpochFields::new(
            years[t],
            to_calendar(months[t], "start_mo")?,
            to_calendar(days[t], "start_dy")?,
            to_calendar(hours[t], "start_hr")?,
            to_calendar(minutes[t], "start_mt")?,
        ));
    }

    let colat = read_records(&nc_file, "colat", nepochs)?;
    let mlt = read_records(&nc_file, "mlt", nepochs)?;
    let jr = read_records(&nc_file, "Jr", nepochs)?;

    info!(
        file = %source,
        nlat,
        nlon,
        epochs = nepochs,
        "Loaded AMPERE grid file"
    );

    AmpereDataset::new(source, nlat, nlon, epochs, colat, mlt, jr)
}

// =============================================================================
// Internal helpers
// =============================================================================

fn variable<'f>(nc_file: &'f netcdf::File, name: &str) -> AmpereResult<netcdf::Variable<'f>> {
    nc_file
        .variable(name)
        .ok_or_else(|| AmpereError::MissingData(format!("{} variable", name)))
}

fn read_i32(nc_file: &netcdf::File, name: &str) -> AmpereResult<Vec<i32>> {
    let values: Vec<i32> = variable(nc_file, name)?
        .get_values(..)
        .map_err(|e| AmpereError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;
    Ok(values)
}

fn read_f64(nc_file: &netcdf::File, name: &str) -> AmpereResult<Vec<f64>> {
    let values: Vec<f64> = variable(nc_file, name)?
        .get_values(..)
        .map_err(|e| AmpereError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;
    Ok(values)
}

/// Grid counts are stored per epoch; the first entry is authoritative.
fn first_count(nc_file: &netcdf::File, name: &str) -> AmpereResult<usize> {
    let values = read_i32(nc_file, name)?;
    let first = *values
        .first()
        .ok_or_else(|| AmpereError::MissingData(format!("{} has no values", name)))?;
    usize::try_from(first)
        .map_err(|_| AmpereError::InvalidFormat(format!("{} is negative: {}", name, first)))
}

fn to_calendar(value: i32, name: &str) -> AmpereResult<u32> {
    u32::try_from(value)
        .map_err(|_| AmpereError::InvalidFormat(format!("{} is negative: {}", name, value)))
}

/// Split a `(time, n)` variable into one vector per epoch.
fn read_records(
    nc_file: &netcdf::File,
    name: &str,
    nepochs: usize,
) -> AmpereResult<Vec<Vec<f64>>> {
    let flat = read_f64(nc_file, name)?;
    if nepochs == 0 {
        return Ok(Vec::new());
    }
    if flat.len() % nepochs != 0 {
        return Err(AmpereError::InvalidFormat(format!(
            "{} holds {} values, not a multiple of {} epochs",
            name,
            flat.len(),
            nepochs
        )));
    }

    let per_epoch = flat.len() / nepochs;
    debug!(variable = name, per_epoch, "Splitting AMPERE records");
    Ok(flat.chunks(per_epoch.max(1)).map(<[f64]>::to_vec).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_ampere_file("/nonexistent/20110926.1000.86400.120.north.grd.ncdf")
            .unwrap_err();
        assert!(matches!(err, AmpereError::IoError(_)));
    }

    #[test]
    fn test_silence_is_idempotent() {
        silence_hdf5_errors();
        silence_hdf5_errors();
    }
}
