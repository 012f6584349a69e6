//! Statistics Route

use aggregation::{aggregate, Period};
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use telemetry::Metric;

use super::{round1, Envelope};
use crate::{ApiResult, SharedState};

const STAT_METRICS: [Metric; 7] = [
    Metric::Aqi,
    Metric::Pm25,
    Metric::Pm10,
    Metric::No2,
    Metric::O3,
    Metric::So2,
    Metric::Co,
];

#[derive(Debug, Default, Deserialize)]
pub struct StatisticsQuery {
    pub period: Option<String>,
}

/// Window averages; pollutants to one decimal, AQI to an integer
#[derive(Debug, Serialize)]
pub struct Statistics {
    pub period: &'static str,
    pub count: usize,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub co: f64,
    pub aqi: i64,
}

pub async fn get_statistics(
    State(state): State<SharedState>,
    Query(params): Query<StatisticsQuery>,
) -> ApiResult<Json<Envelope<Statistics>>> {
    let period = Period::parse_or_default(params.period.as_deref().unwrap_or_default());
    let since = period.since(Utc::now());

    let repo = state.read().await.repository.clone();
    let readings = repo.air_quality_since(since).await?;
    let stats = aggregate(&readings, since, &STAT_METRICS);
    let avg = |m: Metric| round1(stats.avg(m).unwrap_or(0.0));

    Ok(Json(Envelope::ok(Statistics {
        period: period.as_str(),
        count: stats.count,
        pm25: avg(Metric::Pm25),
        pm10: avg(Metric::Pm10),
        no2: avg(Metric::No2),
        o3: avg(Metric::O3),
        so2: avg(Metric::So2),
        co: avg(Metric::Co),
        aqi: stats.avg(Metric::Aqi).unwrap_or(0.0).round() as i64,
    })))
}
