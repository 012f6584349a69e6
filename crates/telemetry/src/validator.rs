//! Value Validator for Range Checking

use crate::error::ValidationError;
use crate::Metric;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Drop non-finite values. Absent stays absent; nothing becomes zero.
pub fn sanitize(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Plausible physical ranges per metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Concentration range for every pollutant (µg/m³)
    pub concentration_range: (f64, f64),
    /// AQI range
    pub aqi_range: (f64, f64),
    /// Air temperature range (°C)
    pub temperature_range: (f64, f64),
    /// Relative humidity range (%)
    pub humidity_range: (f64, f64),
    /// Sea-level pressure range (hPa)
    pub pressure_range: (f64, f64),
    /// Wind speed range (m/s)
    pub wind_speed_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            concentration_range: (0.0, 100_000.0),
            aqi_range: (0.0, 1000.0),
            temperature_range: (-90.0, 60.0),
            humidity_range: (0.0, 100.0),
            pressure_range: (850.0, 1100.0),
            wind_speed_range: (0.0, 120.0),
        }
    }
}

/// Validator applied to ingested values before they are stored
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    fn range_for(&self, metric: Metric) -> (f64, f64) {
        match metric {
            Metric::Aqi => self.config.aqi_range,
            Metric::Temperature => self.config.temperature_range,
            Metric::Humidity => self.config.humidity_range,
            Metric::Pressure => self.config.pressure_range,
            Metric::WindSpeed => self.config.wind_speed_range,
            _ => self.config.concentration_range,
        }
    }

    /// Validate a single value against the metric's range
    pub fn validate(&self, metric: Metric, value: f64) -> Result<f64, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { metric });
        }
        let (min, max) = self.range_for(metric);
        if value < min || value > max {
            Err(ValidationError::OutOfRange {
                metric,
                value,
                min,
                max,
            })
        } else {
            Ok(value)
        }
    }

    /// Validate an optional value, turning rejects into absence
    pub fn check(&self, metric: Metric, value: Option<f64>) -> Option<f64> {
        let value = value?;
        match self.validate(metric, value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Discarding reading value: {}", e);
                None
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
