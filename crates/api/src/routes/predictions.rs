//! Prediction Routes

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use forecast::{ForecastBase, ForecastPoint, ForecastSummary, Trend};
use serde::Serialize;
use tracing::debug;

use super::{round1, Envelope};
use crate::{ApiResult, SharedState};

pub const MODEL_NAME: &str = "Hourly profile";

/// Forecast plus model info
#[derive(Debug, Serialize)]
pub struct PredictionData {
    pub predictions: Vec<ForecastPoint>,
    pub model: &'static str,
    /// Mean confidence over the horizon, percent
    pub confidence: f64,
    /// AQI of the first forecast hour
    pub predicted_aqi: Option<i64>,
    pub trend: Trend,
}

/// Published forecast, or one generated on demand before the first cycle
pub async fn get_predictions(State(state): State<SharedState>) -> ApiResult<Json<Envelope<PredictionData>>> {
    let state = state.read().await;
    let mut predictions = state.forecast.read().await.clone();

    if predictions.is_empty() {
        let base = state
            .repository
            .latest_air_quality()
            .await?
            .map(|r| ForecastBase {
                aqi: r.aqi.map(|a| a as f64),
                pm25: r.levels.pm25,
            });
        predictions = state.forecaster.forecast(base, Utc::now());
        debug!("No published forecast, generated {} points on demand", predictions.len());
    }

    let summary = ForecastSummary::from_points(&predictions);

    Ok(Json(Envelope::ok(PredictionData {
        model: MODEL_NAME,
        confidence: summary.as_ref().map_or(0.0, |s| round1(s.mean_confidence)),
        predicted_aqi: predictions.first().map(|p| p.aqi),
        trend: summary.map_or(Trend::Stable, |s| s.trend),
        predictions,
    })))
}
