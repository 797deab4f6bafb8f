//! Physical configuration for surface integration.

use serde::{Deserialize, Serialize};

/// Mean Earth radius, km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Height of the current-carrying ionospheric shell, km.
pub const IONOSPHERE_ALTITUDE_KM: f64 = 110.0;

/// Configuration for flux integration and plotting-style saturation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    /// Earth radius in kilometres.
    pub earth_radius_km: f64,

    /// Altitude of the integration shell in kilometres.
    pub altitude_km: f64,

    /// Optional symmetric clamp applied to grid values before output.
    pub saturation_limit: Option<f64>,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            earth_radius_km: EARTH_RADIUS_KM,
            altitude_km: IONOSPHERE_ALTITUDE_KM,
            saturation_limit: None,
        }
    }
}

impl IntegrationConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `IONO_EARTH_RADIUS_KM`, `IONO_ALTITUDE_KM` and
    /// `IONO_SATURATION`. Unset or unparsable variables leave the field alone.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let number = |key: &str| lookup(key).and_then(|val| val.trim().parse::<f64>().ok());

        if let Some(radius) = number("IONO_EARTH_RADIUS_KM") {
            self.earth_radius_km = radius;
        }

        if let Some(altitude) = number("IONO_ALTITUDE_KM") {
            self.altitude_km = altitude;
        }

        if let Some(limit) = number("IONO_SATURATION") {
            self.saturation_limit = Some(limit);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.earth_radius_km > 0.0) {
            return Err("earth_radius_km must be > 0".to_string());
        }

        if !(self.altitude_km >= 0.0) {
            return Err("altitude_km must be >= 0".to_string());
        }

        if let Some(limit) = self.saturation_limit {
            if !(limit > 0.0) {
                return Err("saturation_limit must be > 0".to_string());
            }
        }

        Ok(())
    }

    /// Radius of the integration shell in metres.
    pub fn radius_m(&self) -> f64 {
        (self.earth_radius_km + self.altitude_km) * 1000.0
    }
}
