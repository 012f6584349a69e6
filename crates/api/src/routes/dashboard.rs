//! Dashboard Route

use aggregation::{latest_per_source, Period};
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use telemetry::{AirQualityReading, Metric, Reading, SensorReading, WeatherObservation};

use super::Envelope;
use crate::{ApiError, ApiResult, SharedState};

const ALL_ZONES: &str = "toutes";

/// Query parameters for the dashboard endpoint
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub period: Option<String>,
    pub zone: Option<String>,
    pub pollutant: Option<String>,
}

/// Location label for a zone filter; `None` means every sensor
pub fn zone_label(zone: &str) -> Option<&str> {
    match zone.trim() {
        "" | ALL_ZONES | "all" => None,
        "centre" => Some("Centre-ville"),
        "industrielle" => Some("Zone Industrielle"),
        "residentiel" => Some("Résidentiel Nord"),
        other => Some(other),
    }
}

/// A history row: the reading, its `%H:%M` label and the selected value
#[derive(Debug, Serialize)]
pub struct HistoryPoint<R> {
    pub time: String,
    #[serde(flatten)]
    pub reading: R,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl<R: Reading> HistoryPoint<R> {
    fn new(reading: R, metric: Metric) -> Self {
        Self {
            time: reading.timestamp().format("%H:%M").to_string(),
            value: reading.metric(metric),
            reading,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Latest {
    pub air_quality: Option<AirQualityReading>,
    pub weather: Option<WeatherObservation>,
    pub iot_sensors: Vec<SensorReading>,
}

#[derive(Debug, Serialize)]
pub struct History {
    pub air_quality: Vec<HistoryPoint<AirQualityReading>>,
    pub weather: Vec<HistoryPoint<WeatherObservation>>,
}

#[derive(Debug, Serialize)]
pub struct Filters {
    pub period: &'static str,
    pub zone: String,
    pub pollutant: Metric,
}

#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub latest: Latest,
    pub history: History,
    pub filters: Filters,
}

/// Latest values, windowed history and the echoed filters
pub async fn get_dashboard(
    State(state): State<SharedState>,
    Query(params): Query<DashboardQuery>,
) -> ApiResult<Json<Envelope<DashboardData>>> {
    let pollutant = match params.pollutant.as_deref() {
        Some(name) => name
            .parse::<Metric>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => Metric::Pm25,
    };
    let period = Period::parse_or_default(params.period.as_deref().unwrap_or_default());
    let zone = params.zone.unwrap_or_else(|| ALL_ZONES.to_string());

    let repo = state.read().await.repository.clone();
    let since = period.since(Utc::now());

    let sensors = repo.latest_sensor_readings(zone_label(&zone)).await?;
    let iot_sensors = latest_per_source(&sensors).into_values().cloned().collect();

    let latest = Latest {
        air_quality: repo.latest_air_quality().await?,
        weather: repo.latest_weather().await?,
        iot_sensors,
    };

    let history = History {
        air_quality: repo
            .air_quality_since(since)
            .await?
            .into_iter()
            .map(|r| HistoryPoint::new(r, pollutant))
            .collect(),
        weather: repo
            .weather_since(since)
            .await?
            .into_iter()
            .map(|r| HistoryPoint::new(r, pollutant))
            .collect(),
    };

    Ok(Json(Envelope::ok(DashboardData {
        latest,
        history,
        filters: Filters {
            period: period.as_str(),
            zone,
            pollutant,
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_aliases() {
        assert_eq!(zone_label("toutes"), None);
        assert_eq!(zone_label("all"), None);
        assert_eq!(zone_label("centre"), Some("Centre-ville"));
        assert_eq!(zone_label("industrielle"), Some("Zone Industrielle"));
        assert_eq!(zone_label("residentiel"), Some("Résidentiel Nord"));
        assert_eq!(zone_label("Est Paris"), Some("Est Paris"));
    }
}
