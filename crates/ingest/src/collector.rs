//! Collection Cycle

use alerting::{AlertEvaluator, ThresholdTable, ZonePopulations};
use chrono::{DateTime, Utc};
use forecast::{ForecastBase, ForecastPoint, Forecaster};
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use storage::Repository;
use telemetry::AirQualityReading;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{AirQualityClient, IngestError, SensorSimulator, WeatherClient};

/// Latest published forecast, shared with readers
pub type ForecastSlot = Arc<RwLock<Vec<ForecastPoint>>>;

/// Zone the air-quality station is attributed to for alerting
pub const DEFAULT_STATION_ZONE: &str = "Zone Industrielle";

/// Outcome of one collection cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub air_quality: bool,
    pub weather: bool,
    pub sensors_stored: usize,
    pub alerts_raised: usize,
    pub forecast_points: usize,
}

/// Runs air quality, weather and sensor collection in sequence.
///
/// A failing source is logged and counted; it never stops the cycle.
pub struct Collector {
    repository: Repository,
    air_quality: AirQualityClient,
    weather: WeatherClient,
    simulator: SensorSimulator,
    thresholds: ThresholdTable,
    populations: ZonePopulations,
    station_zone: String,
    forecaster: Forecaster,
    forecast: ForecastSlot,
}

impl Collector {
    pub fn new(
        repository: Repository,
        air_quality: AirQualityClient,
        weather: WeatherClient,
        simulator: SensorSimulator,
    ) -> Self {
        Self {
            repository,
            air_quality,
            weather,
            simulator,
            thresholds: ThresholdTable::default(),
            populations: ZonePopulations::default(),
            station_zone: DEFAULT_STATION_ZONE.to_string(),
            forecaster: Forecaster::new(0),
            forecast: ForecastSlot::default(),
        }
    }

    /// Thresholds, populations and the zone used for station alerts
    pub fn with_alerting(
        mut self,
        thresholds: ThresholdTable,
        populations: ZonePopulations,
        station_zone: impl Into<String>,
    ) -> Self {
        self.thresholds = thresholds;
        self.populations = populations;
        self.station_zone = station_zone.into();
        self
    }

    /// Forecaster run after each cycle and the slot it publishes to
    pub fn with_forecast(mut self, forecaster: Forecaster, slot: ForecastSlot) -> Self {
        self.forecaster = forecaster;
        self.forecast = slot;
        self
    }

    pub fn forecast_slot(&self) -> ForecastSlot {
        Arc::clone(&self.forecast)
    }

    /// Run one full collection cycle
    pub async fn run_cycle(&mut self) -> CycleReport {
        let now = Utc::now();
        let mut report = CycleReport::default();
        counter!("ingest_cycles_total").increment(1);

        match self.collect_air_quality(now).await {
            Ok(reading) => {
                report.air_quality = true;
                report.alerts_raised = self.raise_alerts(&reading).await;
            }
            Err(e) => {
                warn!("Air quality collection failed: {}", e);
                counter!("ingest_source_failures_total", "source" => "air_quality").increment(1);
            }
        }

        match self.collect_weather(now).await {
            Ok(()) => report.weather = true,
            Err(e) => {
                warn!("Weather collection failed: {}", e);
                counter!("ingest_source_failures_total", "source" => "weather").increment(1);
            }
        }

        for reading in self.simulator.sample(now) {
            match self.repository.insert_sensor_reading(&reading).await {
                Ok(_) => report.sensors_stored += 1,
                Err(e) => {
                    warn!("Sensor {} not stored: {}", reading.sensor_id, e);
                    counter!("ingest_source_failures_total", "source" => "iot_sensors").increment(1);
                }
            }
        }

        report.forecast_points = self.refresh_forecast(now).await;

        info!(
            "Cycle complete: air={} weather={} sensors={} alerts={}",
            report.air_quality, report.weather, report.sensors_stored, report.alerts_raised
        );
        report
    }

    async fn collect_air_quality(&self, now: DateTime<Utc>) -> Result<AirQualityReading, IngestError> {
        let mut reading = self.air_quality.fetch(now).await?;
        reading.id = self.repository.insert_air_quality(&reading).await?;
        Ok(reading)
    }

    async fn collect_weather(&self, now: DateTime<Utc>) -> Result<(), IngestError> {
        let obs = self.weather.fetch(now).await?;
        self.repository.insert_weather(&obs).await?;
        Ok(())
    }

    async fn raise_alerts(&self, reading: &AirQualityReading) -> usize {
        let evaluator = AlertEvaluator::new(&self.thresholds, &self.populations);
        let alerts = evaluator.evaluate(&self.station_zone, &reading.levels, reading.timestamp);

        let mut raised = 0;
        for alert in &alerts {
            match self.repository.insert_alert(alert).await {
                Ok(_) => {
                    raised += 1;
                    counter!("alerts_raised_total", "severity" => alert.severity.as_str())
                        .increment(1);
                }
                Err(e) => warn!("Alert for {} not stored: {}", alert.pollutant, e),
            }
        }
        raised
    }

    async fn refresh_forecast(&self, now: DateTime<Utc>) -> usize {
        let base = match self.repository.latest_air_quality().await {
            Ok(latest) => latest.map(|r| ForecastBase {
                aqi: r.aqi.map(|a| a as f64),
                pm25: r.levels.pm25,
            }),
            Err(e) => {
                warn!("Latest air quality unavailable for forecast: {}", e);
                None
            }
        };

        let points = self.forecaster.forecast(base, now);
        let count = points.len();
        *self.forecast.write().await = points;
        debug!("Published {} forecast points", count);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{default_sites, AirQualityConfig, WeatherConfig};
    use alerting::{AlertStatus, Severity};
    use telemetry::Pollutant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const FEED: &str = r#"{"status":"ok","data":{"aqi":90,"city":{"name":"Paris"},"iaqi":{"pm25":{"v":90},"no2":{"v":20}}}}"#;
    const WEATHER: &str = r#"{"main":{"temp":18.5,"humidity":60,"pressure":1015},"wind":{"speed":3.2},"name":"Paris"}"#;

    /// Minimal HTTP responder serving the feed and weather bodies by path
    async fn serve_fixtures() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]);
                    let body = if request.contains("/feed/") { FEED } else { WEATHER };
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    fn collector(repo: Repository, base_url: &str) -> Collector {
        let air = AirQualityClient::new(AirQualityConfig {
            base_url: base_url.to_string(),
            timeout_secs: 2,
            ..Default::default()
        })
        .unwrap();
        let weather = WeatherClient::new(WeatherConfig {
            base_url: base_url.to_string(),
            timeout_secs: 2,
            ..Default::default()
        })
        .unwrap();
        Collector::new(repo, air, weather, SensorSimulator::new(default_sites(), 11))
            .with_forecast(Forecaster::new(3), ForecastSlot::default())
    }

    #[tokio::test]
    async fn test_unreachable_sources_still_store_sensors() {
        let repo = Repository::in_memory().await.unwrap();
        let mut collector = collector(repo.clone(), "http://127.0.0.1:9");

        let report = collector.run_cycle().await;
        assert!(!report.air_quality);
        assert!(!report.weather);
        assert_eq!(report.sensors_stored, 3);
        assert_eq!(report.alerts_raised, 0);

        let counts = repo.counts().await.unwrap();
        assert_eq!(counts.iot_sensors, 3);
        assert_eq!(counts.air_quality, 0);

        // Fallback outlook is still published without a station reading
        assert_eq!(report.forecast_points, 24);
        assert_eq!(collector.forecast_slot().read().await.len(), 24);
    }

    /// Accepts connections and holds them open without ever replying
    async fn serve_silence() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_silent_sources_time_out_and_cycle_completes() {
        let base_url = serve_silence().await;
        let repo = Repository::in_memory().await.unwrap();
        let air = AirQualityClient::new(AirQualityConfig {
            base_url: base_url.clone(),
            timeout_secs: 1,
            ..Default::default()
        })
        .unwrap();
        let weather = WeatherClient::new(WeatherConfig {
            base_url,
            timeout_secs: 1,
            ..Default::default()
        })
        .unwrap();
        let mut collector = Collector::new(repo.clone(), air, weather, SensorSimulator::new(default_sites(), 5));

        let started = std::time::Instant::now();
        let report = tokio::time::timeout(std::time::Duration::from_secs(10), collector.run_cycle())
            .await
            .unwrap();
        let elapsed = started.elapsed();

        // Two sources, each bounded by its 1s client timeout plus 1s outer deadline
        assert!(elapsed < std::time::Duration::from_secs(5), "cycle took {:?}", elapsed);
        assert!(!report.air_quality);
        assert!(!report.weather);
        assert_eq!(report.sensors_stored, 3);
        assert_eq!(repo.counts().await.unwrap().iot_sensors, 3);
    }

    #[tokio::test]
    async fn test_full_cycle_raises_station_alerts() {
        let base_url = serve_fixtures().await;
        let repo = Repository::in_memory().await.unwrap();
        let mut collector = collector(repo.clone(), &base_url);

        let report = collector.run_cycle().await;
        assert!(report.air_quality);
        assert!(report.weather);
        assert_eq!(report.sensors_stored, 3);
        assert_eq!(report.alerts_raised, 1);

        let alerts = repo.active_alerts(50).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].pollutant, Pollutant::Pm25);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].zone, "Zone Industrielle");
        assert_eq!(alerts[0].population, 15_000);
        assert_eq!(alerts[0].status, AlertStatus::Active);

        let latest = repo.latest_weather().await.unwrap().unwrap();
        assert_eq!(latest.temperature, Some(18.5));
    }

    #[tokio::test]
    async fn test_custom_station_zone() {
        let base_url = serve_fixtures().await;
        let repo = Repository::in_memory().await.unwrap();
        let mut collector = collector(repo.clone(), &base_url).with_alerting(
            ThresholdTable::default(),
            ZonePopulations::default(),
            "Quartier Sud",
        );

        collector.run_cycle().await;
        let alerts = repo.active_alerts(50).await.unwrap();
        assert_eq!(alerts[0].zone, "Quartier Sud");
        assert_eq!(alerts[0].population, alerting::DEFAULT_POPULATION);
    }
}
