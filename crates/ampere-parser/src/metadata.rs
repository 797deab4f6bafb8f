//! AMPERE filename metadata.
//!
//! Event files are named `YYYYMMDD.HHMM.<span>.<cadence>.<hemisphere>.grd.ncdf`,
//! e.g. `20110926.1000.86400.120.north.grd.ncdf`.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use iono_common::Hemisphere;

/// Fields encoded in an AMPERE grid filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmpereFileInfo {
    /// Start of the event file
    pub start: DateTime<Utc>,
    /// Seconds covered by the file
    pub span_secs: u32,
    /// Seconds between epochs
    pub cadence_secs: u32,
    pub hemisphere: Hemisphere,
}

impl AmpereFileInfo {
    /// Whether `time` falls inside the file's span.
    pub fn covers(&self, time: DateTime<Utc>) -> bool {
        let end = self.start + chrono::Duration::seconds(i64::from(self.span_secs));
        time >= self.start && time < end
    }
}

/// Parse an AMPERE filename (directory components are ignored).
///
/// Returns `None` when the name does not follow the event-file layout.
pub fn parse_ampere_filename<P: AsRef<Path>>(path: P) -> Option<AmpereFileInfo> {
    let filename = path.as_ref().file_name()?.to_str()?;
    let parts: Vec<&str> = filename.split('.').collect();
    if parts.len() < 7 || parts[5] != "grd" || parts[6] != "ncdf" {
        return None;
    }

    let stamp = format!("{}{}", parts[0], parts[1]);
    if stamp.len() != 12 {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(&stamp, "%Y%m%d%H%M").ok()?;
    let start = Utc.from_utc_datetime(&naive);

    let span_secs = parts[2].parse().ok()?;
    let cadence_secs = parts[3].parse().ok()?;
    let hemisphere = match parts[4] {
        "north" => Hemisphere::North,
        "south" => Hemisphere::South,
        _ => return None,
    };

    Some(AmpereFileInfo {
        start,
        span_secs,
        cadence_secs,
        hemisphere,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_filename() {
        let info =
            parse_ampere_filename("AMPERE/Sept2011/20110926.1000.86400.120.south.grd.ncdf")
                .unwrap();
        assert_eq!(info.start, Utc.with_ymd_and_hms(2011, 9, 26, 10, 0, 0).unwrap());
        assert_eq!(info.span_secs, 86400);
        assert_eq!(info.cadence_secs, 120);
        assert_eq!(info.hemisphere, Hemisphere::South);
    }

    #[test]
    fn test_covers_span() {
        let info = parse_ampere_filename("20110926.1000.86400.120.north.grd.ncdf").unwrap();
        assert!(info.covers(Utc.with_ymd_and_hms(2011, 9, 27, 0, 0, 0).unwrap()));
        assert!(!info.covers(Utc.with_ymd_and_hms(2011, 9, 27, 10, 0, 0).unwrap()));
        assert!(!info.covers(Utc.with_ymd_and_hms(2011, 9, 26, 9, 58, 0).unwrap()));
    }

    #[test]
    fn test_rejects_other_names() {
        assert!(parse_ampere_filename("it110926_140800_000.idl").is_none());
        assert!(parse_ampere_filename("20110926.1000.86400.120.east.grd.ncdf").is_none());
        assert!(parse_ampere_filename("20110926.1000.86400.120.north.nc").is_none());
    }
}
