//! Pollutant and Metric Catalogue

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::validator::sanitize;

/// Pollutant channels tracked by the alerting pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pollutant {
    Pm25,
    Pm10,
    No2,
    O3,
    So2,
    Co,
    Nh3,
}

impl Pollutant {
    /// Every pollutant, in reporting order
    pub const ALL: [Pollutant; 7] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::O3,
        Pollutant::So2,
        Pollutant::Co,
        Pollutant::Nh3,
    ];

    /// Storage / wire key
    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm25",
            Pollutant::Pm10 => "pm10",
            Pollutant::No2 => "no2",
            Pollutant::O3 => "o3",
            Pollutant::So2 => "so2",
            Pollutant::Co => "co",
            Pollutant::Nh3 => "nh3",
        }
    }

    /// Human-readable label used in alert messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::No2 => "NO2 (Nitrogen dioxide)",
            Pollutant::O3 => "O3 (Ozone)",
            Pollutant::So2 => "SO2 (Sulfur dioxide)",
            Pollutant::Co => "CO (Carbon monoxide)",
            Pollutant::Nh3 => "NH3 (Ammonia)",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pollutant {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pollutant::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownMetric(s.to_string()))
    }
}

/// Any numeric column that can be aggregated over a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Aqi,
    Pm25,
    Pm10,
    No2,
    O3,
    So2,
    Co,
    Nh3,
    Temperature,
    Humidity,
    Pressure,
    WindSpeed,
}

impl Metric {
    pub const ALL: [Metric; 12] = [
        Metric::Aqi,
        Metric::Pm25,
        Metric::Pm10,
        Metric::No2,
        Metric::O3,
        Metric::So2,
        Metric::Co,
        Metric::Nh3,
        Metric::Temperature,
        Metric::Humidity,
        Metric::Pressure,
        Metric::WindSpeed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Aqi => "aqi",
            Metric::Pm25 => "pm25",
            Metric::Pm10 => "pm10",
            Metric::No2 => "no2",
            Metric::O3 => "o3",
            Metric::So2 => "so2",
            Metric::Co => "co",
            Metric::Nh3 => "nh3",
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::Pressure => "pressure",
            Metric::WindSpeed => "wind_speed",
        }
    }

    /// The pollutant channel behind this metric, if any
    pub fn pollutant(&self) -> Option<Pollutant> {
        match self {
            Metric::Pm25 => Some(Pollutant::Pm25),
            Metric::Pm10 => Some(Pollutant::Pm10),
            Metric::No2 => Some(Pollutant::No2),
            Metric::O3 => Some(Pollutant::O3),
            Metric::So2 => Some(Pollutant::So2),
            Metric::Co => Some(Pollutant::Co),
            Metric::Nh3 => Some(Pollutant::Nh3),
            _ => None,
        }
    }
}

impl From<Pollutant> for Metric {
    fn from(p: Pollutant) -> Self {
        match p {
            Pollutant::Pm25 => Metric::Pm25,
            Pollutant::Pm10 => Metric::Pm10,
            Pollutant::No2 => Metric::No2,
            Pollutant::O3 => Metric::O3,
            Pollutant::So2 => Metric::So2,
            Pollutant::Co => Metric::Co,
            Pollutant::Nh3 => Metric::Nh3,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownMetric(s.to_string()))
    }
}

/// Per-pollutant concentrations (µg/m³). Absent channels stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantLevels {
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub co: Option<f64>,
    pub nh3: Option<f64>,
}

impl PollutantLevels {
    /// Value of a channel. Non-finite values read as absent, including ones
    /// written straight into the public fields.
    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        let raw = match pollutant {
            Pollutant::Pm25 => self.pm25,
            Pollutant::Pm10 => self.pm10,
            Pollutant::No2 => self.no2,
            Pollutant::O3 => self.o3,
            Pollutant::So2 => self.so2,
            Pollutant::Co => self.co,
            Pollutant::Nh3 => self.nh3,
        };
        sanitize(raw)
    }

    /// Set a channel. Non-finite values are stored as absent.
    pub fn set(&mut self, pollutant: Pollutant, value: Option<f64>) {
        let value = sanitize(value);
        match pollutant {
            Pollutant::Pm25 => self.pm25 = value,
            Pollutant::Pm10 => self.pm10 = value,
            Pollutant::No2 => self.no2 = value,
            Pollutant::O3 => self.o3 = value,
            Pollutant::So2 => self.so2 = value,
            Pollutant::Co => self.co = value,
            Pollutant::Nh3 => self.nh3 = value,
        }
    }

    /// Builder-style variant of [`set`](Self::set)
    pub fn with(mut self, pollutant: Pollutant, value: f64) -> Self {
        self.set(pollutant, Some(value));
        self
    }

    /// Present channels only
    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        Pollutant::ALL
            .iter()
            .filter_map(move |&p| self.get(p).map(|v| (p, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(metric.as_str().parse::<Metric>().unwrap(), metric);
        }
        assert_eq!("PM25".parse::<Metric>().unwrap(), Metric::Pm25);
        assert!("benzene".parse::<Metric>().is_err());
    }

    #[test]
    fn test_pollutant_metric_mapping() {
        for p in Pollutant::ALL {
            assert_eq!(Metric::from(p).pollutant(), Some(p));
        }
        assert_eq!(Metric::Temperature.pollutant(), None);
    }

    #[test]
    fn test_levels_ignore_non_finite() {
        let mut levels = PollutantLevels::default();
        levels.set(Pollutant::Pm25, Some(f64::NAN));
        levels.set(Pollutant::No2, Some(f64::INFINITY));
        levels.set(Pollutant::O3, Some(42.0));

        assert_eq!(levels.pm25, None);
        assert_eq!(levels.no2, None);
        assert_eq!(levels.iter().collect::<Vec<_>>(), vec![(Pollutant::O3, 42.0)]);
    }

    #[test]
    fn test_non_finite_fields_read_as_absent() {
        let levels = PollutantLevels {
            pm10: Some(f64::INFINITY),
            o3: Some(f64::NAN),
            co: Some(420.0),
            ..Default::default()
        };
        assert_eq!(levels.get(Pollutant::Pm10), None);
        assert_eq!(levels.get(Pollutant::O3), None);
        assert_eq!(levels.iter().collect::<Vec<_>>(), vec![(Pollutant::Co, 420.0)]);

        let only_bad = PollutantLevels {
            so2: Some(f64::NEG_INFINITY),
            ..Default::default()
        };
        assert!(only_bad.is_empty());
    }

    #[test]
    fn test_levels_serialize_as_flat_keys() {
        let levels = PollutantLevels::default().with(Pollutant::Pm10, 31.5);
        let json = serde_json::to_value(levels).unwrap();
        assert_eq!(json["pm10"], 31.5);
        assert!(json["pm25"].is_null());
    }
}
