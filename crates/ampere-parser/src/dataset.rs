//! In-memory form of an AMPERE hemispheric grid file.
//!
//! A file holds one record per epoch (typically every two minutes across a
//! day). Each record stores colatitude, magnetic local time and radial current
//! density as flat arrays of length `nlat * nlon`, latitude fastest
//! (`index = i + j * nlat`).

use chrono::{DateTime, Utc};
use tracing::debug;

use iono_common::epoch_timestamp;

use crate::error::{AmpereError, AmpereResult};

/// Calendar fields of one epoch's start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl EpochFields {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
        }
    }

    /// Epoch start with seconds truncated to zero.
    pub fn timestamp(&self) -> AmpereResult<DateTime<Utc>> {
        epoch_timestamp(self.year, self.month, self.day, self.hour, self.minute)
            .map_err(|e| AmpereError::InvalidFormat(e.to_string()))
    }
}

/// Decoded contents of one AMPERE file.
#[derive(Debug, Clone)]
pub struct AmpereDataset {
    /// Source path or label, used in error messages
    pub source: String,
    /// Number of latitude rings
    pub nlat: usize,
    /// Number of local-time sectors
    pub nlon: usize,
    epochs: Vec<EpochFields>,
    colat: Vec<Vec<f64>>,
    mlt: Vec<Vec<f64>>,
    jr: Vec<Vec<f64>>,
}

/// Borrowed view of a single epoch.
#[derive(Debug, Clone, Copy)]
pub struct AmpereRecord<'a> {
    pub nlat: usize,
    pub nlon: usize,
    pub timestamp: DateTime<Utc>,
    /// Colatitude in degrees
    pub colat: &'a [f64],
    /// Magnetic local time in hours
    pub mlt: &'a [f64],
    /// Radial current density in µA/m²
    pub jr: &'a [f64],
}

impl AmpereDataset {
    /// Assemble a dataset, checking that every per-epoch array has
    /// `nlat * nlon` values and that all fields cover the same epochs.
    pub fn new(
        source: impl Into<String>,
        nlat: usize,
        nlon: usize,
        epochs: Vec<EpochFields>,
        colat: Vec<Vec<f64>>,
        mlt: Vec<Vec<f64>>,
        jr: Vec<Vec<f64>>,
    ) -> AmpereResult<Self> {
        let expected = nlat * nlon;

        for (name, field) in [("colat", &colat), ("mlt", &mlt), ("Jr", &jr)] {
            if field.len() != epochs.len() {
                return Err(AmpereError::InvalidFormat(format!(
                    "{} covers {} epochs, time fields cover {}",
                    name,
                    field.len(),
                    epochs.len()
                )));
            }
            if let Some(bad) = field.iter().find(|record| record.len() != expected) {
                return Err(AmpereError::ShapeMismatch {
                    field: name.to_string(),
                    expected,
                    actual: bad.len(),
                });
            }
        }

        Ok(Self {
            source: source.into(),
            nlat,
            nlon,
            epochs,
            colat,
            mlt,
            jr,
        })
    }

    /// Number of epochs in the file.
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn epochs(&self) -> &[EpochFields] {
        &self.epochs
    }

    /// All epoch timestamps in file order.
    pub fn timestamps(&self) -> AmpereResult<Vec<DateTime<Utc>>> {
        self.epochs.iter().map(EpochFields::timestamp).collect()
    }

    /// Index of the epoch whose timestamp equals `timestamp` exactly.
    ///
    /// There is no nearest-neighbour fallback: a timestamp that falls between
    /// epochs is `TimestampNotFound`.
    pub fn epoch_index(&self, timestamp: DateTime<Utc>) -> AmpereResult<usize> {
        for (index, epoch) in self.epochs.iter().enumerate() {
            if epoch.timestamp()? == timestamp {
                debug!(file = %self.source, %timestamp, index, "Matched AMPERE epoch");
                return Ok(index);
            }
        }

        Err(AmpereError::TimestampNotFound {
            timestamp,
            file: self.source.clone(),
        })
    }

    /// The record for `timestamp`.
    pub fn record(&self, timestamp: DateTime<Utc>) -> AmpereResult<AmpereRecord<'_>> {
        let index = self.epoch_index(timestamp)?;
        Ok(AmpereRecord {
            nlat: self.nlat,
            nlon: self.nlon,
            timestamp,
            colat: &self.colat[index],
            mlt: &self.mlt[index],
            jr: &self.jr[index],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn three_epochs() -> AmpereDataset {
        let epochs = vec![
            EpochFields::new(2011, 9, 26, 10, 0),
            EpochFields::new(2011, 9, 26, 10, 2),
            EpochFields::new(2011, 9, 26, 10, 4),
        ];
        let per_epoch = |base: f64| vec![vec![base; 4], vec![base + 1.0; 4], vec![base + 2.0; 4]];
        AmpereDataset::new("test", 2, 2, epochs, per_epoch(0.0), per_epoch(10.0), per_epoch(100.0))
            .unwrap()
    }

    #[test]
    fn test_middle_epoch_lookup() {
        let dataset = three_epochs();
        let t = Utc.with_ymd_and_hms(2011, 9, 26, 10, 2, 0).unwrap();

        let record = dataset.record(t).unwrap();
        assert_eq!(record.colat, &[1.0; 4]);
        assert_eq!(record.mlt, &[11.0; 4]);
        assert_eq!(record.jr, &[101.0; 4]);
    }

    #[test]
    fn test_absent_timestamp_not_found() {
        let dataset = three_epochs();
        let t = Utc.with_ymd_and_hms(2011, 9, 26, 10, 3, 0).unwrap();

        match dataset.record(t) {
            Err(AmpereError::TimestampNotFound { timestamp, file }) => {
                assert_eq!(timestamp, t);
                assert_eq!(file, "test");
            }
            other => panic!("expected TimestampNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_seconds_never_match() {
        let dataset = three_epochs();
        let t = Utc.with_ymd_and_hms(2011, 9, 26, 10, 2, 30).unwrap();
        assert!(dataset.epoch_index(t).is_err());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = AmpereDataset::new(
            "bad",
            2,
            3,
            vec![EpochFields::new(2011, 9, 26, 10, 0)],
            vec![vec![0.0; 6]],
            vec![vec![0.0; 5]],
            vec![vec![0.0; 6]],
        )
        .unwrap_err();

        assert!(matches!(
            err,
            AmpereError::ShapeMismatch { expected: 6, actual: 5, .. }
        ));
    }

    #[test]
    fn test_invalid_calendar_surfaces() {
        let dataset = AmpereDataset::new(
            "bad",
            1,
            1,
            vec![EpochFields::new(2011, 2, 30, 0, 0)],
            vec![vec![0.0]],
            vec![vec![0.0]],
            vec![vec![0.0]],
        )
        .unwrap();
        assert!(matches!(dataset.timestamps(), Err(AmpereError::InvalidFormat(_))));
    }
}
