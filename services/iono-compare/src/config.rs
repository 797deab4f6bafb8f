//! Run configuration.
//!
//! Loaded from a YAML document; `${VAR}` and `~` in directory paths are
//! expanded after parsing. `IONO_*` environment variables override the
//! `integration` block, and command-line flags override both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use iono_common::TimeRange;
use polar_grid::IntegrationConfig;

/// Inputs and time window of a comparison run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory holding AMPERE `.grd.ncdf` event files
    pub ampere_dir: PathBuf,

    /// Directory holding SWMF IE `itYYMMDD_HHMMSS_000.idl[.gz]` output
    pub swmf_dir: PathBuf,

    /// Directory holding `mag_grid_e*.out` files
    pub mag_grid_dir: PathBuf,

    /// Start of the AMPERE event file, part of its filename
    pub ampere_event_start: Option<DateTime<Utc>>,

    /// Span of the AMPERE event file, seconds
    pub ampere_span_secs: u32,

    /// AMPERE record cadence, seconds
    pub ampere_cadence_secs: u32,

    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,

    /// Step between processed timestamps
    pub cadence_minutes: i64,

    pub integration: IntegrationConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ampere_dir: PathBuf::from("."),
            swmf_dir: PathBuf::from("."),
            mag_grid_dir: PathBuf::from("."),
            ampere_event_start: None,
            ampere_span_secs: 86400,
            ampere_cadence_secs: 120,
            start: None,
            end: None,
            cadence_minutes: 2,
            integration: IntegrationConfig::from_env(),
        }
    }
}

impl RunConfig {
    /// Load a YAML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read run config from {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid run config {:?}", path))
    }

    /// Parse a YAML document and expand its paths.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config: Self =
            serde_yaml::from_str(content).context("Failed to parse run config YAML")?;
        config.expand_paths()?;
        config.integration.apply_env();
        Ok(config)
    }

    /// Configuration file if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn expand_paths(&mut self) -> Result<()> {
        for dir in [&mut self.ampere_dir, &mut self.swmf_dir, &mut self.mag_grid_dir] {
            *dir = expand_path(dir)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.cadence_minutes <= 0 {
            anyhow::bail!("cadence_minutes must be > 0, got {}", self.cadence_minutes);
        }
        if self.ampere_span_secs == 0 || self.ampere_cadence_secs == 0 {
            anyhow::bail!("AMPERE span and cadence must be > 0");
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                anyhow::bail!("start {} is after end {}", start, end);
            }
        }
        self.integration
            .validate()
            .map_err(|e| anyhow::anyhow!("integration: {}", e))?;
        Ok(())
    }

    /// The `[start, end]` window; both ends must be set.
    pub fn time_range(&self) -> Result<TimeRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Ok(TimeRange::new(start, end)),
            _ => anyhow::bail!("start and end must both be set (config file or --start/--end)"),
        }
    }

    pub fn cadence(&self) -> Duration {
        Duration::minutes(self.cadence_minutes)
    }

    /// AMPERE event start, falling back to the beginning of the run window.
    pub fn event_start(&self) -> Result<DateTime<Utc>> {
        self.ampere_event_start
            .or(self.start)
            .context("ampere_event_start is not set")
    }
}

/// Expand `~` and `${VAR}` in a path.
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Failed to expand path {:?}", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.cadence_minutes, 2);
        assert_eq!(config.ampere_cadence_secs, 120);
        assert!(config.time_range().is_err());
    }

    #[test]
    fn test_parse_yaml() {
        let config = RunConfig::from_yaml(
            r#"
ampere_dir: /data/ampere
swmf_dir: /data/swmf
start: 2011-09-26T10:00:00Z
end: 2011-09-26T12:00:00Z
cadence_minutes: 10
integration:
  saturation_limit: 1.5
"#,
        )
        .unwrap();

        assert_eq!(config.ampere_dir, PathBuf::from("/data/ampere"));
        assert_eq!(config.cadence_minutes, 10);
        assert_eq!(config.integration.saturation_limit, Some(1.5));
        assert_eq!(
            config.event_start().unwrap(),
            Utc.with_ymd_and_hms(2011, 9, 26, 10, 0, 0).unwrap()
        );
        assert_eq!(config.time_range().unwrap().steps(config.cadence()).unwrap().len(), 13);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_expand_env_in_paths() {
        std::env::set_var("IONO_COMPARE_TEST_ROOT", "/scratch/run1");
        let config = RunConfig::from_yaml("mag_grid_dir: ${IONO_COMPARE_TEST_ROOT}/mag").unwrap();
        assert_eq!(config.mag_grid_dir, PathBuf::from("/scratch/run1/mag"));
    }

    #[test]
    fn test_env_overrides_integration_block() {
        std::env::set_var("IONO_ALTITUDE_KM", "300");
        let config = RunConfig::from_yaml("integration:\n  altitude_km: 150.0\n").unwrap();
        std::env::remove_var("IONO_ALTITUDE_KM");

        assert_eq!(config.integration.altitude_km, 300.0);
        assert_eq!(config.integration.radius_m(), 6_671_000.0);
    }

    #[test]
    fn test_unset_variable_is_error() {
        assert!(RunConfig::from_yaml("swmf_dir: ${IONO_COMPARE_SURELY_UNSET}/x").is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let config = RunConfig {
            start: Some(Utc.with_ymd_and_hms(2011, 9, 26, 12, 0, 0).unwrap()),
            end: Some(Utc.with_ymd_and_hms(2011, 9, 26, 10, 0, 0).unwrap()),
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            cadence_minutes: 0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
