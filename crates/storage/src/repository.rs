//! Repository Implementation

use alerting::{Alert, AlertStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use telemetry::{AirQualityReading, Pollutant, SensorReading, WeatherObservation};
use tracing::{debug, info};

use crate::rows::{to_millis, AirQualityRow, AlertRow, SensorRow, WeatherRow};
use crate::schema::STATEMENTS;
use crate::StorageError;

const AIR_QUALITY_COLUMNS: &str =
    "id, timestamp_ms, city, aqi, pm25, pm10, no2, o3, so2, co, nh3, station_name, raw_data";
const WEATHER_COLUMNS: &str = "id, timestamp_ms, city, temperature, feels_like, temp_min, temp_max, \
     humidity, pressure, wind_speed, wind_direction, clouds, visibility, weather_main, \
     weather_description, raw_data";
const SENSOR_COLUMNS: &str = "id, timestamp_ms, sensor_id, location_name, location_lat, location_lon, \
     pm25, pm10, no2, o3, so2, co, temperature, humidity, status";
const ALERT_COLUMNS: &str =
    "id, timestamp_ms, pollutant, type, zone, level, message, value, threshold, population, status";

/// Row totals per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordCounts {
    pub air_quality: i64,
    pub weather: i64,
    pub iot_sensors: i64,
    pub active_alerts: i64,
}

/// Repository over a SQLite pool. Cloning shares the pool.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Open (creating if missing) a SQLite database and apply the schema
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        info!("Opening SQLite repository at {}", url);
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.migrate().await?;
        Ok(repo)
    }

    /// Private in-memory database on a single long-lived connection
    pub async fn in_memory() -> Result<Self, StorageError> {
        debug!("Creating in-memory repository");
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.migrate().await?;
        Ok(repo)
    }

    /// Create tables and indexes if they do not exist
    pub async fn migrate(&self) -> Result<(), StorageError> {
        for statement in STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Append an air-quality reading, returning its id
    pub async fn insert_air_quality(&self, reading: &AirQualityReading) -> Result<i64, StorageError> {
        let l = &reading.levels;
        let id = sqlx::query(
            "INSERT INTO air_quality \
             (timestamp_ms, city, aqi, pm25, pm10, no2, o3, so2, co, nh3, station_name, raw_data) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(to_millis(reading.timestamp))
        .bind(&reading.city)
        .bind(reading.aqi)
        .bind(l.get(Pollutant::Pm25))
        .bind(l.get(Pollutant::Pm10))
        .bind(l.get(Pollutant::No2))
        .bind(l.get(Pollutant::O3))
        .bind(l.get(Pollutant::So2))
        .bind(l.get(Pollutant::Co))
        .bind(l.get(Pollutant::Nh3))
        .bind(&reading.station_name)
        .bind(&reading.raw_data)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!("Inserted air quality reading {}", id);
        Ok(id)
    }

    /// Append a weather observation, returning its id
    pub async fn insert_weather(&self, obs: &WeatherObservation) -> Result<i64, StorageError> {
        let id = sqlx::query(
            "INSERT INTO weather \
             (timestamp_ms, city, temperature, feels_like, temp_min, temp_max, humidity, pressure, \
              wind_speed, wind_direction, clouds, visibility, weather_main, weather_description, raw_data) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(to_millis(obs.timestamp))
        .bind(&obs.city)
        .bind(obs.temperature)
        .bind(obs.feels_like)
        .bind(obs.temp_min)
        .bind(obs.temp_max)
        .bind(obs.humidity)
        .bind(obs.pressure)
        .bind(obs.wind_speed)
        .bind(obs.wind_direction)
        .bind(obs.clouds)
        .bind(obs.visibility)
        .bind(&obs.weather_main)
        .bind(&obs.weather_description)
        .bind(&obs.raw_data)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!("Inserted weather observation {}", id);
        Ok(id)
    }

    /// Append an IoT sensor reading, returning its id
    pub async fn insert_sensor_reading(&self, reading: &SensorReading) -> Result<i64, StorageError> {
        let l = &reading.levels;
        let id = sqlx::query(
            "INSERT INTO iot_sensors \
             (timestamp_ms, sensor_id, location_name, location_lat, location_lon, \
              pm25, pm10, no2, o3, so2, co, temperature, humidity, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(to_millis(reading.timestamp))
        .bind(&reading.sensor_id)
        .bind(&reading.location_name)
        .bind(reading.location_lat)
        .bind(reading.location_lon)
        .bind(l.get(Pollutant::Pm25))
        .bind(l.get(Pollutant::Pm10))
        .bind(l.get(Pollutant::No2))
        .bind(l.get(Pollutant::O3))
        .bind(l.get(Pollutant::So2))
        .bind(l.get(Pollutant::Co))
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(&reading.status)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    /// Append an alert to the alert log, returning its id
    pub async fn insert_alert(&self, alert: &Alert) -> Result<i64, StorageError> {
        let id = sqlx::query(
            "INSERT INTO alerts \
             (timestamp_ms, pollutant, type, zone, level, message, value, threshold, population, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(to_millis(alert.timestamp))
        .bind(alert.pollutant.as_str())
        .bind(&alert.kind)
        .bind(&alert.zone)
        .bind(alert.severity.as_str())
        .bind(&alert.message)
        .bind(alert.value)
        .bind(alert.threshold)
        .bind(i64::from(alert.population))
        .bind(alert.status.as_str())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!("Inserted {} alert {} for {}", alert.severity, id, alert.zone);
        Ok(id)
    }

    /// Most recent air-quality reading
    pub async fn latest_air_quality(&self) -> Result<Option<AirQualityReading>, StorageError> {
        let sql = format!(
            "SELECT {AIR_QUALITY_COLUMNS} FROM air_quality ORDER BY timestamp_ms DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, AirQualityRow>(&sql)
            .fetch_optional(&self.pool)
            .await?
            .map(AirQualityReading::try_from)
            .transpose()
    }

    /// Most recent weather observation
    pub async fn latest_weather(&self) -> Result<Option<WeatherObservation>, StorageError> {
        let sql = format!(
            "SELECT {WEATHER_COLUMNS} FROM weather ORDER BY timestamp_ms DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, WeatherRow>(&sql)
            .fetch_optional(&self.pool)
            .await?
            .map(WeatherObservation::try_from)
            .transpose()
    }

    /// Air-quality readings at or after `since`, oldest first
    pub async fn air_quality_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<AirQualityReading>, StorageError> {
        let sql = format!(
            "SELECT {AIR_QUALITY_COLUMNS} FROM air_quality WHERE timestamp_ms >= ? \
             ORDER BY timestamp_ms ASC, id ASC"
        );
        sqlx::query_as::<_, AirQualityRow>(&sql)
            .bind(to_millis(since))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(AirQualityReading::try_from)
            .collect()
    }

    /// Most recent `limit` air-quality readings, newest first
    pub async fn recent_air_quality(&self, limit: usize) -> Result<Vec<AirQualityReading>, StorageError> {
        let sql = format!(
            "SELECT {AIR_QUALITY_COLUMNS} FROM air_quality ORDER BY timestamp_ms DESC, id DESC LIMIT ?"
        );
        sqlx::query_as::<_, AirQualityRow>(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(AirQualityReading::try_from)
            .collect()
    }

    /// Weather observations at or after `since`, oldest first
    pub async fn weather_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<WeatherObservation>, StorageError> {
        let sql = format!(
            "SELECT {WEATHER_COLUMNS} FROM weather WHERE timestamp_ms >= ? \
             ORDER BY timestamp_ms ASC, id ASC"
        );
        sqlx::query_as::<_, WeatherRow>(&sql)
            .bind(to_millis(since))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(WeatherObservation::try_from)
            .collect()
    }

    /// Every sensor reading, optionally restricted to one location, in insertion order
    pub async fn sensor_readings(&self, zone: Option<&str>) -> Result<Vec<SensorReading>, StorageError> {
        let rows = match zone {
            Some(zone) => {
                let sql = format!(
                    "SELECT {SENSOR_COLUMNS} FROM iot_sensors WHERE location_name = ? ORDER BY id ASC"
                );
                sqlx::query_as::<_, SensorRow>(&sql)
                    .bind(zone)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {SENSOR_COLUMNS} FROM iot_sensors ORDER BY id ASC");
                sqlx::query_as::<_, SensorRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(SensorReading::try_from).collect()
    }

    /// Each sensor's newest rows, optionally restricted to one location.
    ///
    /// Rows sharing a sensor's latest timestamp are all returned; callers
    /// break the tie on insertion sequence.
    pub async fn latest_sensor_readings(
        &self,
        zone: Option<&str>,
    ) -> Result<Vec<SensorReading>, StorageError> {
        let rows = match zone {
            Some(zone) => {
                let sql = format!(
                    "SELECT {SENSOR_COLUMNS} FROM iot_sensors \
                     WHERE location_name = ? AND (sensor_id, timestamp_ms) IN ( \
                         SELECT sensor_id, MAX(timestamp_ms) FROM iot_sensors \
                         WHERE location_name = ? GROUP BY sensor_id) \
                     ORDER BY sensor_id ASC, id ASC"
                );
                sqlx::query_as::<_, SensorRow>(&sql)
                    .bind(zone)
                    .bind(zone)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {SENSOR_COLUMNS} FROM iot_sensors \
                     WHERE (sensor_id, timestamp_ms) IN ( \
                         SELECT sensor_id, MAX(timestamp_ms) FROM iot_sensors GROUP BY sensor_id) \
                     ORDER BY sensor_id ASC, id ASC"
                );
                sqlx::query_as::<_, SensorRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(SensorReading::try_from).collect()
    }

    /// Sensor readings at or after `since`, oldest first
    pub async fn sensor_readings_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<SensorReading>, StorageError> {
        let sql = format!(
            "SELECT {SENSOR_COLUMNS} FROM iot_sensors WHERE timestamp_ms >= ? \
             ORDER BY timestamp_ms ASC, id ASC"
        );
        sqlx::query_as::<_, SensorRow>(&sql)
            .bind(to_millis(since))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(SensorReading::try_from)
            .collect()
    }

    /// Active alerts, newest first, at most `limit`
    pub async fn active_alerts(&self, limit: usize) -> Result<Vec<Alert>, StorageError> {
        let sql = format!(
            "SELECT {ALERT_COLUMNS} FROM alerts WHERE status = ? \
             ORDER BY timestamp_ms DESC, id DESC LIMIT ?"
        );
        sqlx::query_as::<_, AlertRow>(&sql)
            .bind(AlertStatus::Active.as_str())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Alert::try_from)
            .collect()
    }

    /// Fetch one alert by id
    pub async fn get_alert(&self, id: i64) -> Result<Alert, StorageError> {
        let sql = format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE id = ?");
        let row = sqlx::query_as::<_, AlertRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;
        Alert::try_from(row)
    }

    /// Number of active alerts raised at or after `since`
    pub async fn count_active_alerts_since(&self, since: DateTime<Utc>) -> Result<i64, StorageError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE status = ? AND timestamp_ms >= ?")
                .bind(AlertStatus::Active.as_str())
                .bind(to_millis(since))
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Operator status transition; the only mutation the alert log allows
    pub async fn set_alert_status(&self, id: i64, status: AlertStatus) -> Result<Alert, StorageError> {
        let result = sqlx::query("UPDATE alerts SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        info!("Alert {} set to {}", id, status);
        self.get_alert(id).await
    }

    /// Row totals for health reporting
    pub async fn counts(&self) -> Result<RecordCounts, StorageError> {
        Ok(RecordCounts {
            air_quality: self.count_rows("SELECT COUNT(*) FROM air_quality").await?,
            weather: self.count_rows("SELECT COUNT(*) FROM weather").await?,
            iot_sensors: self.count_rows("SELECT COUNT(*) FROM iot_sensors").await?,
            active_alerts: sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE status = ?")
                .bind(AlertStatus::Active.as_str())
                .fetch_one(&self.pool)
                .await?,
        })
    }

    async fn count_rows(&self, sql: &str) -> Result<i64, StorageError> {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}
