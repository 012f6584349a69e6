//! Data Ingestion
//!
//! Adapters for the AQICN air-quality feed and the OpenWeather current
//! conditions endpoint, the IoT sensor simulator, and the collection cycle
//! that stores readings, raises alerts and refreshes the forecast.

mod air_quality;
mod collector;
mod scheduler;
mod simulator;
mod weather;

pub use air_quality::{parse_feed, AirQualityClient, AirQualityConfig};
pub use collector::{Collector, CycleReport, ForecastSlot, DEFAULT_STATION_ZONE};
pub use scheduler::{run_scheduler, Cycle};
pub use simulator::{default_sites, SensorSimulator, SensorSite};
pub use weather::{parse_weather, WeatherClient, WeatherConfig};

use thiserror::Error;

/// Ingestion errors; each one is confined to the source that raised it
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Upstream reported failure: {0}")]
    Upstream(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

impl From<serde_json::Error> for IngestError {
    fn from(e: serde_json::Error) -> Self {
        IngestError::Parse(e.to_string())
    }
}

/// Map non-success statuses to `IngestError::Api`
pub(crate) async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, IngestError> {
    if !resp.status().is_success() {
        return Err(IngestError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Run a request future under an outer deadline on top of the client timeout
pub(crate) async fn with_deadline<T, F>(secs: u64, fut: F) -> Result<T, IngestError>
where
    F: std::future::Future<Output = Result<T, IngestError>>,
{
    tokio::time::timeout(std::time::Duration::from_secs(secs + 1), fut)
        .await
        .map_err(|_| IngestError::Timeout(secs))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_a_stalled_request() {
        let started = tokio::time::Instant::now();
        let result: Result<(), IngestError> = with_deadline(2, std::future::pending()).await;
        assert!(matches!(result, Err(IngestError::Timeout(2))));
        assert!(started.elapsed() >= std::time::Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_deadline_passes_through_results() {
        let ok = with_deadline(1, async { Ok::<_, IngestError>(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err = with_deadline(1, async { Err::<(), _>(IngestError::Parse("bad".into())) }).await;
        assert!(matches!(err, Err(IngestError::Parse(_))));
    }
}
