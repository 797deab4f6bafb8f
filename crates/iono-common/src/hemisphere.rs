//! Hemisphere and precipitation-species identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Magnetic hemisphere of a polar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    pub const BOTH: [Hemisphere; 2] = [Hemisphere::North, Hemisphere::South];

    /// Field-name prefix used by model output (`n_jr`, `s_theta`, ...).
    pub fn prefix(&self) -> &'static str {
        match self {
            Hemisphere::North => "n",
            Hemisphere::South => "s",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Hemisphere::North => "north",
            Hemisphere::South => "south",
        }
    }

    /// Parse from string (case-insensitive). Accepts `north`/`n`/`south`/`s`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "north" | "n" | "nh" => Some(Hemisphere::North),
            "south" | "s" | "sh" => Some(Hemisphere::South),
            _ => None,
        }
    }

    /// Detect the hemisphere from a filename such as
    /// `20110926.1000.86400.120.north.grd.ncdf`.
    ///
    /// The filename is split on `.`, `_` and `-`; a token equal to `north` or
    /// `south` decides. Returns `None` when neither token is present.
    pub fn from_filename<P: AsRef<Path>>(path: P) -> Option<Self> {
        let filename = path.as_ref().file_name()?.to_str()?.to_lowercase();

        filename
            .split(['.', '_', '-'])
            .find_map(|token| match token {
                "north" => Some(Hemisphere::North),
                "south" => Some(Hemisphere::South),
                _ => None,
            })
    }

    /// Substring rule used by older processing scripts: any filename whose
    /// stem contains `north` is Northern, everything else is Southern.
    pub fn from_filename_legacy<P: AsRef<Path>>(path: P) -> Self {
        let is_north = path
            .as_ref()
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|stem| stem.contains("north"))
            .unwrap_or(false);

        if is_north {
            Hemisphere::North
        } else {
            Hemisphere::South
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Auroral precipitation sources carried by the ionospheric model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecipitationSpecies {
    /// Electron diffuse precipitation
    ElectronDiffuse,
    /// Ion diffuse precipitation
    IonDiffuse,
    /// Monoenergetic (discrete, current-driven) precipitation
    Monoenergetic,
    /// Broadband (Alfvénic) precipitation
    Broadband,
}

impl PrecipitationSpecies {
    pub const ALL: [PrecipitationSpecies; 4] = [
        PrecipitationSpecies::ElectronDiffuse,
        PrecipitationSpecies::IonDiffuse,
        PrecipitationSpecies::Monoenergetic,
        PrecipitationSpecies::Broadband,
    ];

    /// Field-name prefix in the model file (`diff_e-flux`, `mono_e-flux`, ...).
    pub fn key(&self) -> &'static str {
        match self {
            PrecipitationSpecies::ElectronDiffuse => "diff",
            PrecipitationSpecies::IonDiffuse => "idif",
            PrecipitationSpecies::Monoenergetic => "mono",
            PrecipitationSpecies::Broadband => "bbnd",
        }
    }

    /// Short name used in hemispheric power tables.
    pub fn label(&self) -> &'static str {
        match self {
            PrecipitationSpecies::ElectronDiffuse => "Diffuse",
            PrecipitationSpecies::IonDiffuse => "IonDiff",
            PrecipitationSpecies::Monoenergetic => "Mono",
            PrecipitationSpecies::Broadband => "Broadband",
        }
    }
}

impl fmt::Display for PrecipitationSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename_tokens() {
        assert_eq!(
            Hemisphere::from_filename("AMPERE/20110926.1000.86400.120.north.grd.ncdf"),
            Some(Hemisphere::North)
        );
        assert_eq!(
            Hemisphere::from_filename("/data/20110926.1000.86400.120.south.grd.ncdf"),
            Some(Hemisphere::South)
        );
        assert_eq!(Hemisphere::from_filename("20110926.grd.ncdf"), None);
        // A token match is required, not a substring.
        assert_eq!(Hemisphere::from_filename("northern_lights.ncdf"), None);
    }

    #[test]
    fn test_from_filename_legacy_defaults_south() {
        assert_eq!(
            Hemisphere::from_filename_legacy("20110926.1000.86400.120.north.grd.ncdf"),
            Hemisphere::North
        );
        assert_eq!(
            Hemisphere::from_filename_legacy("20110926.1000.86400.120.grd.ncdf"),
            Hemisphere::South
        );
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(Hemisphere::North.prefix(), "n");
        assert_eq!(Hemisphere::South.prefix(), "s");
        assert_eq!(Hemisphere::parse("SOUTH"), Some(Hemisphere::South));
        assert_eq!(Hemisphere::parse("east"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Hemisphere::North).unwrap(), "\"north\"");
        let species: PrecipitationSpecies = serde_json::from_str("\"ion_diffuse\"").unwrap();
        assert_eq!(species, PrecipitationSpecies::IonDiffuse);
    }

    #[test]
    fn test_species_keys() {
        let keys: Vec<_> = PrecipitationSpecies::ALL.iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec!["diff", "idif", "mono", "bbnd"]);
        assert_eq!(PrecipitationSpecies::IonDiffuse.label(), "IonDiff");
    }
}
