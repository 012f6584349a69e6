//! Forecast Summary and Trend

use serde::{Deserialize, Serialize};

use crate::ForecastPoint;

/// AQI delta between the last and first point that counts as a trend
const TREND_MARGIN: i64 = 5;

/// Direction of the outlook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Stable => "stable",
        }
    }
}

/// Compare the last point to the first; fewer than two points is stable
pub fn trend(points: &[ForecastPoint]) -> Trend {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if last.aqi > first.aqi + TREND_MARGIN => Trend::Rising,
        (Some(first), Some(last)) if last.aqi < first.aqi - TREND_MARGIN => Trend::Falling,
        _ => Trend::Stable,
    }
}

/// Aggregate figures over an outlook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub count: usize,
    pub avg_aqi: f64,
    pub min_aqi: i64,
    pub max_aqi: i64,
    pub mean_confidence: f64,
    pub trend: Trend,
}

impl ForecastSummary {
    /// `None` for an empty outlook
    pub fn from_points(points: &[ForecastPoint]) -> Option<Self> {
        let count = points.len();
        let min_aqi = points.iter().map(|p| p.aqi).min()?;
        let max_aqi = points.iter().map(|p| p.aqi).max()?;
        let total: i64 = points.iter().map(|p| p.aqi).sum();
        let confidence: f64 = points.iter().map(|p| f64::from(p.confidence)).sum();

        Some(Self {
            count,
            avg_aqi: total as f64 / count as f64,
            min_aqi,
            max_aqi,
            mean_confidence: confidence / count as f64,
            trend: trend(points),
        })
    }
}
