//! Regridding of AMPERE records onto a closed polar grid.

use chrono::{DateTime, Utc};
use tracing::debug;

use ampere_parser::{AmpereDataset, AmpereRecord};
use iono_common::{FieldGrid, Hemisphere};

use crate::error::{GridError, Result};
use crate::types::{PolarAxes, PolarGrid};

/// Latitude is taken as `COLATITUDE_OFFSET_DEG - colat`.
///
/// The offset is 91 rather than 90 in the AMPERE processing this follows; it
/// has not been checked against the AMPERE grid documentation.
pub const COLATITUDE_OFFSET_DEG: f64 = 91.0;

/// Turn one flat, latitude-fastest AMPERE record into a `PolarGrid` with a
/// ghost column appended.
pub fn regrid_record(record: &AmpereRecord<'_>, hemisphere: Hemisphere) -> Result<PolarGrid> {
    let n_lat = record.nlat;
    let n_sector = record.nlon;
    if n_lat == 0 || n_sector == 0 {
        return Err(GridError::empty_grid(format!(
            "AMPERE record at {} is {} x {}",
            record.timestamp, n_lat, n_sector
        )));
    }

    let expected = n_lat * n_sector;
    for (name, field) in [("colat", record.colat), ("mlt", record.mlt), ("Jr", record.jr)] {
        if field.len() != expected {
            return Err(GridError::ShapeMismatch(format!(
                "{} has {} values, expected {} x {}",
                name,
                field.len(),
                n_lat,
                n_sector
            )));
        }
    }

    let cols = n_sector + 1;
    let mut latitude = FieldGrid::zeros(n_lat, cols);
    let mut local_time = FieldGrid::zeros(n_lat, cols);
    let mut value = FieldGrid::zeros(n_lat, cols);

    for j in 0..n_sector {
        for i in 0..n_lat {
            let index = i + j * n_lat;
            latitude.set(i, j, COLATITUDE_OFFSET_DEG - record.colat[index]);
            local_time.set(i, j, record.mlt[index]);
            value.set(i, j, record.jr[index]);
        }
    }

    // Ghost column closes the circle; sector 0 of ring i sits at flat index i.
    for i in 0..n_lat {
        latitude.set(i, n_sector, COLATITUDE_OFFSET_DEG - record.colat[i]);
        local_time.set(i, n_sector, record.mlt[i] + n_sector as f64);
        value.set(i, n_sector, record.jr[i]);
    }

    Ok(PolarGrid {
        hemisphere,
        timestamp: Some(record.timestamp),
        n_lat,
        n_sector,
        latitude,
        local_time,
        value,
    })
}

/// Resolve `timestamp` in `dataset`, regrid it and convert to polar axes.
pub fn load_ampere_grid(
    dataset: &AmpereDataset,
    timestamp: DateTime<Utc>,
    hemisphere: Hemisphere,
) -> Result<PolarAxes> {
    let record = dataset.record(timestamp)?;
    let grid = regrid_record(&record, hemisphere)?;

    debug!(
        file = %dataset.source,
        %timestamp,
        %hemisphere,
        n_lat = grid.n_lat,
        n_sector = grid.n_sector,
        "Regridded AMPERE record"
    );

    Ok(grid.to_axes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_utils::ampere_2x3;

    fn record() -> AmpereRecord<'static> {
        AmpereRecord {
            nlat: ampere_2x3::NLAT,
            nlon: ampere_2x3::NLON,
            timestamp: Utc.with_ymd_and_hms(2011, 9, 26, 10, 2, 0).unwrap(),
            colat: &ampere_2x3::COLAT,
            mlt: &ampere_2x3::MLT,
            jr: &ampere_2x3::JR,
        }
    }

    #[test]
    fn test_layout_inversion() {
        let grid = regrid_record(&record(), Hemisphere::North).unwrap();
        assert_eq!(grid.value.shape(), (2, 4));
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(grid.value.get(i, j), Some(ampere_2x3::JR_ROWS[i][j]));
            }
        }
        assert_eq!(grid.latitude.get(0, 0), Some(90.0));
        assert_eq!(grid.latitude.get(1, 2), Some(89.0));
    }

    #[test]
    fn test_ghost_column() {
        let grid = regrid_record(&record(), Hemisphere::South).unwrap();
        for i in 0..grid.n_lat {
            assert_eq!(grid.latitude.get(i, 3), grid.latitude.get(i, 0));
            assert_eq!(grid.value.get(i, 3), grid.value.get(i, 0));
            assert_eq!(
                grid.local_time.get(i, 3).unwrap(),
                grid.local_time.get(i, 0).unwrap() + 3.0
            );
        }
    }

    #[test]
    fn test_empty_dimensions() {
        let mut empty = record();
        empty.nlat = 0;
        empty.colat = &[];
        empty.mlt = &[];
        empty.jr = &[];
        assert!(matches!(
            regrid_record(&empty, Hemisphere::North),
            Err(GridError::EmptyGrid(_))
        ));
    }

    #[test]
    fn test_short_record_rejected() {
        let mut short = record();
        short.jr = &ampere_2x3::JR[..5];
        assert!(matches!(
            regrid_record(&short, Hemisphere::North),
            Err(GridError::ShapeMismatch(_))
        ));
    }
}
