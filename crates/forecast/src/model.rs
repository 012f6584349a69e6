//! Forecast Generation

use chrono::{DateTime, Duration, FixedOffset, Offset, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of hourly points in an outlook
pub const HORIZON_HOURS: i64 = 24;

const DEFAULT_BASE_AQI: f64 = 50.0;
const DEFAULT_BASE_PM25: f64 = 35.0;
const FALLBACK_AQI: i64 = 45;

/// Latest observed values the outlook is anchored on
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForecastBase {
    pub aqi: Option<f64>,
    pub pm25: Option<f64>,
}

/// Coarse air-quality level of a forecast point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastLevel {
    Good,
    Moderate,
    Poor,
}

impl ForecastLevel {
    pub fn from_aqi(aqi: i64) -> Self {
        if aqi <= 50 {
            ForecastLevel::Good
        } else if aqi <= 100 {
            ForecastLevel::Moderate
        } else {
            ForecastLevel::Poor
        }
    }

    /// Presentation class used by dashboards
    pub fn css_class(&self) -> &'static str {
        match self {
            ForecastLevel::Good => "success",
            ForecastLevel::Moderate => "warning",
            ForecastLevel::Poor => "danger",
        }
    }
}

/// One hourly forecast point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Local wall-clock label, `%H:%M`
    pub time: String,
    pub timestamp: DateTime<Utc>,
    pub aqi: i64,
    pub pm25: f64,
    /// Confidence in percent
    pub confidence: u8,
    pub level: ForecastLevel,
    pub level_class: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HourBand {
    Rush,
    Night,
    Normal,
}

impl HourBand {
    fn of(hour: u32) -> Self {
        match hour {
            7..=9 | 17..=19 => HourBand::Rush,
            2..=5 => HourBand::Night,
            _ => HourBand::Normal,
        }
    }
}

/// Seeded forecast generator.
///
/// The RNG is derived from the seed and the generation instant, so the same
/// seed and instant always produce the same outlook.
#[derive(Debug, Clone)]
pub struct Forecaster {
    seed: u64,
    offset: FixedOffset,
}

impl Forecaster {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            offset: Utc.fix(),
        }
    }

    /// Local offset used for hour-of-day bands and time labels
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    fn rng_for(&self, now: DateTime<Utc>) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ now.timestamp_millis() as u64)
    }

    /// 24 hourly points starting one hour after `now`
    pub fn forecast(&self, base: Option<ForecastBase>, now: DateTime<Utc>) -> Vec<ForecastPoint> {
        let mut rng = self.rng_for(now);
        let points: Vec<ForecastPoint> = match base {
            Some(base) => {
                let base_aqi = base.aqi.filter(|v| v.is_finite()).unwrap_or(DEFAULT_BASE_AQI);
                let base_pm25 = base.pm25.filter(|v| v.is_finite()).unwrap_or(DEFAULT_BASE_PM25);
                (1..=HORIZON_HOURS)
                    .map(|h| {
                        let at = now + Duration::hours(h);
                        let factor = match HourBand::of(self.local_hour(at)) {
                            HourBand::Rush => rng.random_range(1.10..=1.25),
                            HourBand::Night => rng.random_range(0.85..=0.95),
                            HourBand::Normal => rng.random_range(0.95..=1.05),
                        };
                        let noise: f64 = rng.random_range(-2.0..=2.0);
                        let aqi = (base_aqi * factor + noise).clamp(10.0, 150.0) as i64;
                        let pm25 = (base_pm25 * factor + noise / 2.0).clamp(5.0, 100.0);
                        self.point(at, aqi, pm25, confidence(95, h))
                    })
                    .collect()
            }
            None => (1..=HORIZON_HOURS)
                .map(|h| {
                    let at = now + Duration::hours(h);
                    let offset: i64 = match HourBand::of(self.local_hour(at)) {
                        HourBand::Rush => rng.random_range(5..15),
                        HourBand::Night => -rng.random_range(5..10),
                        HourBand::Normal => rng.random_range(-5..5),
                    };
                    let aqi = (FALLBACK_AQI + offset).clamp(20, 100);
                    self.point(at, aqi, aqi as f64 * 0.8, confidence(90, h))
                })
                .collect(),
        };

        debug!(
            "Generated {} forecast points ({})",
            points.len(),
            if base.is_some() { "anchored" } else { "fallback" }
        );
        points
    }

    fn local_hour(&self, at: DateTime<Utc>) -> u32 {
        at.with_timezone(&self.offset).hour()
    }

    fn point(&self, at: DateTime<Utc>, aqi: i64, pm25: f64, confidence: u8) -> ForecastPoint {
        let level = ForecastLevel::from_aqi(aqi);
        ForecastPoint {
            time: at.with_timezone(&self.offset).format("%H:%M").to_string(),
            timestamp: at,
            aqi,
            pm25: (pm25 * 10.0).round() / 10.0,
            confidence,
            level,
            level_class: level.css_class().to_string(),
        }
    }
}

fn confidence(start: i64, hour: i64) -> u8 {
    (start - 2 * hour).max(50) as u8
}
