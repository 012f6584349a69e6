//! Report Data Assembly

use aggregation::{aggregate, ReportPeriod};
use chrono::{DateTime, Utc};
use forecast::{ForecastPoint, ForecastSummary};
use serde::{Deserialize, Serialize};
use telemetry::{AirQualityReading, Metric};
use tracing::debug;

/// Fixed operator recommendations printed at the end of every report
pub const RECOMMENDATIONS: [&str; 4] = [
    "Monitor the industrial zone closely",
    "Reinforce monitoring at rush hours (7-9h, 17-19h)",
    "Keep data collection running continuously",
    "Inform the public during pollution peaks",
];

const REPORT_METRICS: [Metric; 5] = [Metric::Aqi, Metric::Pm25, Metric::Pm10, Metric::No2, Metric::O3];

/// Level of detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Summary,
    Detailed,
}

impl ReportFormat {
    /// Parse a format label; French labels are accepted, unknown is summary
    pub fn parse_or_default(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "detailed" | "detaille" | "détaillé" => ReportFormat::Detailed,
            _ => ReportFormat::Summary,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Summary => "summary",
            ReportFormat::Detailed => "detailed",
        }
    }
}

/// What to report on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRequest {
    pub period: ReportPeriod,
    pub format: ReportFormat,
    pub zone: String,
}

impl ReportRequest {
    pub fn new(period: ReportPeriod, format: ReportFormat, zone: impl Into<String>) -> Self {
        Self {
            period,
            format,
            zone: zone.into(),
        }
    }
}

/// Air-quality statistics over the report window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportStats {
    pub avg_aqi: Option<f64>,
    pub max_aqi: Option<f64>,
    pub min_aqi: Option<f64>,
    pub avg_pm25: Option<f64>,
    pub avg_pm10: Option<f64>,
    pub avg_no2: Option<f64>,
    pub avg_o3: Option<f64>,
    pub count: usize,
}

/// Everything a renderer needs, computed once
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportData {
    pub request: ReportRequest,
    pub generated_at: DateTime<Utc>,
    pub window_start: DateTime<Utc>,
    pub stats: ReportStats,
    pub alert_count: i64,
    /// Present only for detailed reports with a non-empty forecast
    pub forecast: Option<ForecastSummary>,
}

impl ReportData {
    pub fn assemble(
        request: ReportRequest,
        air_quality: &[AirQualityReading],
        alert_count: i64,
        forecast: &[ForecastPoint],
        now: DateTime<Utc>,
    ) -> Self {
        let window_start = request.period.since(now);
        let window = aggregate(air_quality, window_start, &REPORT_METRICS);
        let aqi = window.column(Metric::Aqi);

        let stats = ReportStats {
            avg_aqi: aqi.avg,
            max_aqi: aqi.max,
            min_aqi: aqi.min,
            avg_pm25: window.avg(Metric::Pm25),
            avg_pm10: window.avg(Metric::Pm10),
            avg_no2: window.avg(Metric::No2),
            avg_o3: window.avg(Metric::O3),
            count: window.count,
        };

        let forecast = match request.format {
            ReportFormat::Detailed => ForecastSummary::from_points(forecast),
            ReportFormat::Summary => None,
        };

        debug!(
            "Assembled {} {} report over {} readings",
            request.period.as_str(),
            request.format.as_str(),
            stats.count
        );

        Self {
            request,
            generated_at: now,
            window_start,
            stats,
            alert_count,
            forecast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use forecast::Forecaster;
    use telemetry::{Pollutant, PollutantLevels};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 10, 12, 0, 0).unwrap()
    }

    fn air(hours_ago: i64, aqi: Option<i64>, pm25: f64) -> AirQualityReading {
        AirQualityReading {
            id: hours_ago,
            timestamp: now() - Duration::hours(hours_ago),
            city: "Paris".to_string(),
            station_name: "Paris".to_string(),
            aqi,
            levels: PollutantLevels::default().with(Pollutant::Pm25, pm25),
            raw_data: None,
        }
    }

    #[test]
    fn test_format_aliases() {
        assert_eq!(ReportFormat::parse_or_default("detaille"), ReportFormat::Detailed);
        assert_eq!(ReportFormat::parse_or_default("Detailed"), ReportFormat::Detailed);
        assert_eq!(ReportFormat::parse_or_default("resume"), ReportFormat::Summary);
        assert_eq!(ReportFormat::parse_or_default("pdf"), ReportFormat::Summary);
    }

    #[test]
    fn test_daily_window_statistics() {
        let readings = vec![
            air(2, Some(40), 20.0),
            air(10, Some(80), 40.0),
            air(20, None, 30.0),
            air(30, Some(200), 99.0),
        ];
        let request = ReportRequest::new(ReportPeriod::Daily, ReportFormat::Summary, "all");
        let data = ReportData::assemble(request, &readings, 3, &[], now());

        assert_eq!(data.stats.count, 3);
        assert_eq!(data.stats.avg_aqi, Some(60.0));
        assert_eq!(data.stats.max_aqi, Some(80.0));
        assert_eq!(data.stats.min_aqi, Some(40.0));
        assert_eq!(data.stats.avg_pm25, Some(30.0));
        assert_eq!(data.stats.avg_no2, None);
        assert_eq!(data.alert_count, 3);
        assert_eq!(data.window_start, now() - Duration::hours(24));
    }

    #[test]
    fn test_forecast_only_for_detailed() {
        let points = Forecaster::new(1).forecast(None, now());

        let summary = ReportData::assemble(
            ReportRequest::new(ReportPeriod::Weekly, ReportFormat::Summary, "all"),
            &[],
            0,
            &points,
            now(),
        );
        assert!(summary.forecast.is_none());

        let detailed = ReportData::assemble(
            ReportRequest::new(ReportPeriod::Weekly, ReportFormat::Detailed, "all"),
            &[],
            0,
            &points,
            now(),
        );
        assert_eq!(detailed.forecast.unwrap().count, 24);
        assert_eq!(detailed.stats, ReportStats::default());
    }
}
