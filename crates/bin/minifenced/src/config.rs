//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `minifence.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use minifence_domain::geo::GeoPoint;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rule engine settings.
    pub engine: EngineConfig,
    /// Rule storage settings.
    pub rules: RulesConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Initial position of the virtual location provider.
    pub location: LocationConfig,
}

/// Evaluation loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds between two evaluation ticks.
    pub interval_secs: u64,
}

/// Rule file configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// JSON file holding the stored rules.
    pub path: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Seed position. Both coordinates must be set for a fix to exist.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Config {
    /// Load configuration from `minifence.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("minifence.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MINIFENCE_INTERVAL_SECS")
            && let Ok(secs) = val.parse()
        {
            self.engine.interval_secs = secs;
        }
        if let Ok(val) = std::env::var("MINIFENCE_RULES") {
            self.rules.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("MINIFENCE_LOCATION") {
            self.location.apply_pair(&val);
        }
        if let Ok(val) = std::env::var("MINIFENCE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "interval_secs must be non-zero".to_string(),
            ));
        }
        if self.location.latitude.is_some() != self.location.longitude.is_some() {
            return Err(ConfigError::Validation(
                "location needs both latitude and longitude".to_string(),
            ));
        }
        if let Some(lat) = self.location.latitude
            && !(-90.0..=90.0).contains(&lat)
        {
            return Err(ConfigError::Validation(format!(
                "latitude {lat} out of range"
            )));
        }
        if let Some(lon) = self.location.longitude
            && !(-180.0..=180.0).contains(&lon)
        {
            return Err(ConfigError::Validation(format!(
                "longitude {lon} out of range"
            )));
        }
        Ok(())
    }

    /// Period of the evaluation loop.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.engine.interval_secs)
    }
}

impl LocationConfig {
    /// The configured seed position, if any.
    #[must_use]
    pub fn position(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.latitude?, self.longitude?))
    }

    /// Parse a `lat,lon` pair. Malformed input is ignored.
    fn apply_pair(&mut self, raw: &str) {
        let Some((lat, lon)) = raw.split_once(',') else {
            return;
        };
        if let (Ok(lat), Ok(lon)) = (lat.trim().parse(), lon.trim().parse()) {
            self.latitude = Some(lat);
            self.longitude = Some(lon);
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("rules.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "minifenced=info,minifence=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
