//! Reading Records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Metric, PollutantLevels};

/// A timestamped measurement snapshot from one source.
///
/// `sequence` is the storage insertion order (row id) and breaks ties
/// between readings that share a timestamp.
pub trait Reading {
    fn timestamp(&self) -> DateTime<Utc>;
    fn sequence(&self) -> i64;
    /// Station or sensor identifier
    fn source_key(&self) -> &str;
    /// Location label the reading belongs to
    fn zone(&self) -> &str;
    /// Value of a metric, `None` when the source does not carry it
    fn metric(&self, metric: Metric) -> Option<f64>;
}

/// Air-quality station reading (AQICN feed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub city: String,
    pub station_name: String,
    pub aqi: Option<i64>,
    #[serde(flatten)]
    pub levels: PollutantLevels,
    #[serde(skip)]
    pub raw_data: Option<String>,
}

impl Reading for AirQualityReading {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn sequence(&self) -> i64 {
        self.id
    }

    fn source_key(&self) -> &str {
        &self.station_name
    }

    fn zone(&self) -> &str {
        &self.city
    }

    fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Aqi => self.aqi.map(|a| a as f64),
            other => other.pollutant().and_then(|p| self.levels.get(p)),
        }
    }
}

/// Weather observation (OpenWeather feed)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub city: String,
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub clouds: Option<f64>,
    pub visibility: Option<f64>,
    pub weather_main: Option<String>,
    pub weather_description: Option<String>,
    #[serde(skip)]
    pub raw_data: Option<String>,
}

impl Reading for WeatherObservation {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn sequence(&self) -> i64 {
        self.id
    }

    fn source_key(&self) -> &str {
        &self.city
    }

    fn zone(&self) -> &str {
        &self.city
    }

    fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Pressure => self.pressure,
            Metric::WindSpeed => self.wind_speed,
            _ => None,
        }
    }
}

/// IoT sensor reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub sensor_id: String,
    pub location_name: String,
    pub location_lat: Option<f64>,
    pub location_lon: Option<f64>,
    #[serde(flatten)]
    pub levels: PollutantLevels,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub status: String,
}

impl Reading for SensorReading {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn sequence(&self) -> i64 {
        self.id
    }

    fn source_key(&self) -> &str {
        &self.sensor_id
    }

    fn zone(&self) -> &str {
        &self.location_name
    }

    fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Aqi | Metric::Pressure | Metric::WindSpeed => None,
            other => other.pollutant().and_then(|p| self.levels.get(p)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pollutant;
    use chrono::TimeZone;

    fn sensor() -> SensorReading {
        SensorReading {
            id: 7,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            sensor_id: "SENSOR_01".to_string(),
            location_name: "Centre-ville".to_string(),
            location_lat: Some(48.8566),
            location_lon: Some(2.3522),
            levels: PollutantLevels::default().with(Pollutant::Pm25, 18.2),
            temperature: Some(21.0),
            humidity: None,
            status: "active".to_string(),
        }
    }

    #[test]
    fn test_sensor_metrics() {
        let reading = sensor();
        assert_eq!(reading.metric(Metric::Pm25), Some(18.2));
        assert_eq!(reading.metric(Metric::Temperature), Some(21.0));
        assert_eq!(reading.metric(Metric::Humidity), None);
        assert_eq!(reading.metric(Metric::Aqi), None);
        assert_eq!(reading.source_key(), "SENSOR_01");
        assert_eq!(reading.zone(), "Centre-ville");
        assert_eq!(reading.sequence(), 7);
    }

    #[test]
    fn test_air_quality_aqi_metric() {
        let reading = AirQualityReading {
            id: 1,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            city: "Paris".to_string(),
            station_name: "Paris".to_string(),
            aqi: Some(57),
            levels: PollutantLevels::default(),
            raw_data: None,
        };
        assert_eq!(reading.metric(Metric::Aqi), Some(57.0));
        assert_eq!(reading.metric(Metric::Nh3), None);
        assert_eq!(reading.metric(Metric::Temperature), None);
    }

    #[test]
    fn test_weather_metrics() {
        let obs = WeatherObservation {
            wind_speed: Some(3.6),
            pressure: Some(1013.0),
            ..Default::default()
        };
        assert_eq!(obs.metric(Metric::WindSpeed), Some(3.6));
        assert_eq!(obs.metric(Metric::Pressure), Some(1013.0));
        assert_eq!(obs.metric(Metric::Pm25), None);
    }
}
