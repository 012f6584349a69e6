//! Row mappings between SQLite tables and domain records

use alerting::{Alert, AlertStatus, Severity};
use chrono::{DateTime, Utc};
use telemetry::{AirQualityReading, Pollutant, PollutantLevels, SensorReading, WeatherObservation};

use crate::StorageError;

pub(crate) fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| StorageError::InvalidValue {
        column: "timestamp_ms",
        value: ms.to_string(),
    })
}

fn levels(
    pm25: Option<f64>,
    pm10: Option<f64>,
    no2: Option<f64>,
    o3: Option<f64>,
    so2: Option<f64>,
    co: Option<f64>,
    nh3: Option<f64>,
) -> PollutantLevels {
    let mut levels = PollutantLevels::default();
    levels.set(Pollutant::Pm25, pm25);
    levels.set(Pollutant::Pm10, pm10);
    levels.set(Pollutant::No2, no2);
    levels.set(Pollutant::O3, o3);
    levels.set(Pollutant::So2, so2);
    levels.set(Pollutant::Co, co);
    levels.set(Pollutant::Nh3, nh3);
    levels
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AirQualityRow {
    id: i64,
    timestamp_ms: i64,
    city: String,
    aqi: Option<i64>,
    pm25: Option<f64>,
    pm10: Option<f64>,
    no2: Option<f64>,
    o3: Option<f64>,
    so2: Option<f64>,
    co: Option<f64>,
    nh3: Option<f64>,
    station_name: String,
    raw_data: Option<String>,
}

impl TryFrom<AirQualityRow> for AirQualityReading {
    type Error = StorageError;

    fn try_from(row: AirQualityRow) -> Result<Self, Self::Error> {
        Ok(AirQualityReading {
            id: row.id,
            timestamp: from_millis(row.timestamp_ms)?,
            city: row.city,
            station_name: row.station_name,
            aqi: row.aqi,
            levels: levels(row.pm25, row.pm10, row.no2, row.o3, row.so2, row.co, row.nh3),
            raw_data: row.raw_data,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct WeatherRow {
    id: i64,
    timestamp_ms: i64,
    city: String,
    temperature: Option<f64>,
    feels_like: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
    wind_speed: Option<f64>,
    wind_direction: Option<f64>,
    clouds: Option<f64>,
    visibility: Option<f64>,
    weather_main: Option<String>,
    weather_description: Option<String>,
    raw_data: Option<String>,
}

impl TryFrom<WeatherRow> for WeatherObservation {
    type Error = StorageError;

    fn try_from(row: WeatherRow) -> Result<Self, Self::Error> {
        Ok(WeatherObservation {
            id: row.id,
            timestamp: from_millis(row.timestamp_ms)?,
            city: row.city,
            temperature: row.temperature,
            feels_like: row.feels_like,
            temp_min: row.temp_min,
            temp_max: row.temp_max,
            humidity: row.humidity,
            pressure: row.pressure,
            wind_speed: row.wind_speed,
            wind_direction: row.wind_direction,
            clouds: row.clouds,
            visibility: row.visibility,
            weather_main: row.weather_main,
            weather_description: row.weather_description,
            raw_data: row.raw_data,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SensorRow {
    id: i64,
    timestamp_ms: i64,
    sensor_id: String,
    location_name: String,
    location_lat: Option<f64>,
    location_lon: Option<f64>,
    pm25: Option<f64>,
    pm10: Option<f64>,
    no2: Option<f64>,
    o3: Option<f64>,
    so2: Option<f64>,
    co: Option<f64>,
    temperature: Option<f64>,
    humidity: Option<f64>,
    status: String,
}

impl TryFrom<SensorRow> for SensorReading {
    type Error = StorageError;

    fn try_from(row: SensorRow) -> Result<Self, Self::Error> {
        Ok(SensorReading {
            id: row.id,
            timestamp: from_millis(row.timestamp_ms)?,
            sensor_id: row.sensor_id,
            location_name: row.location_name,
            location_lat: row.location_lat,
            location_lon: row.location_lon,
            levels: levels(row.pm25, row.pm10, row.no2, row.o3, row.so2, row.co, None),
            temperature: row.temperature,
            humidity: row.humidity,
            status: row.status,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AlertRow {
    id: i64,
    timestamp_ms: i64,
    pollutant: String,
    #[sqlx(rename = "type")]
    kind: String,
    zone: String,
    level: String,
    message: String,
    value: f64,
    threshold: f64,
    population: i64,
    status: String,
}

impl TryFrom<AlertRow> for Alert {
    type Error = StorageError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        let pollutant = row
            .pollutant
            .parse::<Pollutant>()
            .map_err(|_| StorageError::InvalidValue {
                column: "pollutant",
                value: row.pollutant.clone(),
            })?;
        let severity = row
            .level
            .parse::<Severity>()
            .map_err(|_| StorageError::InvalidValue {
                column: "level",
                value: row.level.clone(),
            })?;
        let status = row
            .status
            .parse::<AlertStatus>()
            .map_err(|_| StorageError::InvalidValue {
                column: "status",
                value: row.status.clone(),
            })?;
        let population = u32::try_from(row.population).map_err(|_| StorageError::InvalidValue {
            column: "population",
            value: row.population.to_string(),
        })?;

        Ok(Alert {
            id: row.id,
            timestamp: from_millis(row.timestamp_ms)?,
            pollutant,
            kind: row.kind,
            zone: row.zone,
            severity,
            message: row.message,
            value: row.value,
            threshold: row.threshold,
            population,
            status,
        })
    }
}
