//! Derived AQI estimate for sensor zones

use serde::Serialize;

/// AQI estimated from an average PM2.5 concentration.
///
/// Absent input estimates to 0.
pub fn estimate_aqi(pm25_avg: Option<f64>) -> i64 {
    pm25_avg
        .filter(|v| v.is_finite())
        .map(|v| (v * 1.5).round() as i64)
        .unwrap_or(0)
}

/// Status label bucketed at AQI 50 / 100 / 150
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AqiStatus {
    Good,
    Moderate,
    Poor,
    VeryPoor,
}

impl AqiStatus {
    pub fn from_aqi(aqi: i64) -> Self {
        if aqi <= 50 {
            AqiStatus::Good
        } else if aqi <= 100 {
            AqiStatus::Moderate
        } else if aqi <= 150 {
            AqiStatus::Poor
        } else {
            AqiStatus::VeryPoor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiStatus::Good => "Good",
            AqiStatus::Moderate => "Moderate",
            AqiStatus::Poor => "Poor",
            AqiStatus::VeryPoor => "Very poor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate() {
        assert_eq!(estimate_aqi(Some(20.0)), 30);
        assert_eq!(estimate_aqi(Some(33.5)), 50);
        assert_eq!(estimate_aqi(Some(33.7)), 51);
        assert_eq!(estimate_aqi(None), 0);
    }

    #[test]
    fn test_status_buckets() {
        assert_eq!(AqiStatus::from_aqi(0), AqiStatus::Good);
        assert_eq!(AqiStatus::from_aqi(50), AqiStatus::Good);
        assert_eq!(AqiStatus::from_aqi(51), AqiStatus::Moderate);
        assert_eq!(AqiStatus::from_aqi(100), AqiStatus::Moderate);
        assert_eq!(AqiStatus::from_aqi(150), AqiStatus::Poor);
        assert_eq!(AqiStatus::from_aqi(151), AqiStatus::VeryPoor);
    }
}
