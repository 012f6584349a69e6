//! Zone Routes

use aggregation::{aggregate_by, estimate_aqi, AqiStatus};
use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use telemetry::{Metric, SensorReading};

use super::{round1, Envelope};
use crate::{ApiResult, SharedState};

const ZONE_METRICS: [Metric; 3] = [Metric::Pm25, Metric::Pm10, Metric::No2];

/// One zone's last-hour summary
#[derive(Debug, Serialize)]
pub struct ZoneSummary {
    pub id: usize,
    pub name: String,
    pub aqi: i64,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub population: u32,
    pub status: &'static str,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

fn max_coordinates(readings: &[SensorReading]) -> BTreeMap<&str, (Option<f64>, Option<f64>)> {
    let mut coords: BTreeMap<&str, (Option<f64>, Option<f64>)> = BTreeMap::new();
    for r in readings {
        let entry = coords.entry(r.location_name.as_str()).or_default();
        entry.0 = max_opt(entry.0, r.location_lat);
        entry.1 = max_opt(entry.1, r.location_lon);
    }
    coords
}

fn max_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Sensor zones with readings in the last hour
pub async fn get_zones(State(state): State<SharedState>) -> ApiResult<Json<Envelope<Vec<ZoneSummary>>>> {
    let state = state.read().await;
    let since = Utc::now() - Duration::hours(1);
    let readings = state.repository.sensor_readings_since(since).await?;

    let groups = aggregate_by(&readings, since, &ZONE_METRICS, |r| r.location_name.clone());
    let coords = max_coordinates(&readings);

    let zones = groups
        .into_iter()
        .enumerate()
        .map(|(i, (name, stats))| {
            let pm25 = stats.avg(Metric::Pm25);
            let aqi = estimate_aqi(pm25);
            let (lat, lon) = coords.get(name.as_str()).copied().unwrap_or_default();
            ZoneSummary {
                id: i + 1,
                population: state.populations.population(&name),
                status: AqiStatus::from_aqi(aqi).label(),
                aqi,
                pm25: round1(pm25.unwrap_or(0.0)),
                pm10: round1(stats.avg(Metric::Pm10).unwrap_or(0.0)),
                no2: round1(stats.avg(Metric::No2).unwrap_or(0.0)),
                lat,
                lon,
                name,
            }
        })
        .collect();

    Ok(Json(Envelope::ok(zones)))
}
