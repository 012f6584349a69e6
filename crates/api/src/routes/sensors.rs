//! Current Conditions Route

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::{round1, Envelope};
use crate::{ApiResult, SharedState};

/// Latest headline values; missing values read as 0
#[derive(Debug, Serialize, PartialEq)]
pub struct CurrentConditions {
    pub aqi: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
}

pub async fn get_current(State(state): State<SharedState>) -> ApiResult<Json<Envelope<CurrentConditions>>> {
    let repo = state.read().await.repository.clone();
    let air = repo.latest_air_quality().await?;
    let weather = repo.latest_weather().await?;

    let aqi = air.and_then(|a| a.aqi).unwrap_or(0);
    let (temperature, humidity, wind_speed) = weather
        .map(|w| (w.temperature, w.humidity, w.wind_speed))
        .unwrap_or_default();

    Ok(Json(Envelope::ok(CurrentConditions {
        aqi,
        temperature: round1(temperature.unwrap_or(0.0)),
        humidity: humidity.unwrap_or(0.0),
        wind_speed: round1(wind_speed.unwrap_or(0.0)),
    })))
}
