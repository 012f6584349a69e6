//! Application Configuration
//!
//! Built-in defaults, then an optional `smartcity.toml` (or the file given on
//! the command line), then `SMARTCITY__*` environment variables, e.g.
//! `SMARTCITY__COLLECTOR__AIR_QUALITY__TOKEN`.

use alerting::{AlertingError, ThresholdTable, ZonePopulations, DEFAULT_POPULATION};
use chrono::FixedOffset;
use config::{Config, Environment, File};
use forecast::Forecaster;
use ingest::{default_sites, AirQualityConfig, SensorSite, WeatherConfig, DEFAULT_STATION_ZONE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use thiserror::Error;

use crate::rate_limit::RateLimitConfig;

const DEFAULT_CONFIG_FILE: &str = "smartcity";
const ENV_PREFIX: &str = "SMARTCITY";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Threshold configuration error: {0}")]
    Thresholds(#[from] AlertingError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("server address: {}", e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://smartcity.db".to_string(),
        }
    }
}

/// Collection cycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub interval_secs: u64,
    /// Zone the air-quality station's alerts are attributed to
    pub station_zone: String,
    /// Simulator seed; random when unset
    pub seed: Option<u64>,
    pub air_quality: AirQualityConfig,
    pub weather: WeatherConfig,
    pub sensors: Vec<SensorSite>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            station_zone: DEFAULT_STATION_ZONE.to_string(),
            seed: None,
            air_quality: AirQualityConfig::default(),
            weather: WeatherConfig::default(),
            sensors: default_sites(),
        }
    }
}

impl CollectorConfig {
    pub fn simulator_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneEntry {
    pub name: String,
    pub population: u32,
}

/// Zone populations as a list; zone names keep their case this way
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonesConfig {
    pub entries: Vec<ZoneEntry>,
    pub fallback_population: u32,
}

impl Default for ZonesConfig {
    fn default() -> Self {
        let entries = ZonePopulations::default()
            .populations
            .into_iter()
            .map(|(name, population)| ZoneEntry { name, population })
            .collect();
        Self {
            entries,
            fallback_population: DEFAULT_POPULATION,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Forecast seed; random when unset
    pub seed: Option<u64>,
    /// Local offset for hour-of-day bands and labels
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub collector: CollectorConfig,
    /// Per-pollutant overrides on top of the default limits
    pub thresholds: BTreeMap<String, f64>,
    pub zones: ZonesConfig,
    pub forecast: ForecastConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load the layered configuration. A missing file is not an error.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name(path.unwrap_or(DEFAULT_CONFIG_FILE)).required(path.is_some()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collector.interval_secs == 0 {
            return Err(ConfigError::Invalid("collector.interval_secs must be positive".into()));
        }
        if self.collector.sensors.is_empty() {
            return Err(ConfigError::Invalid("collector.sensors must not be empty".into()));
        }
        self.rate_limit.validate()?;
        self.threshold_table()?;
        self.utc_offset()?;
        Ok(())
    }

    /// Default limits overlaid with the configured overrides
    pub fn threshold_table(&self) -> Result<ThresholdTable, ConfigError> {
        let overrides = ThresholdTable::try_from(self.thresholds.clone())?;
        Ok(ThresholdTable::default().merged(&overrides))
    }

    pub fn zone_populations(&self) -> ZonePopulations {
        ZonePopulations {
            populations: self
                .zones
                .entries
                .iter()
                .map(|z| (z.name.clone(), z.population))
                .collect(),
            fallback: self.zones.fallback_population,
        }
    }

    fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.forecast.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "forecast.utc_offset_minutes out of range: {}",
                self.forecast.utc_offset_minutes
            ))
        })
    }

    pub fn forecaster(&self) -> Result<Forecaster, ConfigError> {
        let seed = self.forecast.seed.unwrap_or_else(rand::random);
        Ok(Forecaster::new(seed).with_offset(self.utc_offset()?))
    }
}
