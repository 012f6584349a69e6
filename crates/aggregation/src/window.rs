//! Windowed Statistics Computation

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use telemetry::{Metric, Reading};

/// Statistics for one metric over a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ColumnStats {
    /// Mean of present values
    pub avg: Option<f64>,
    /// Minimum present value
    pub min: Option<f64>,
    /// Maximum present value
    pub max: Option<f64>,
    /// Readings in the window, present or not
    pub count: usize,
    /// Readings that carried this metric
    pub samples: usize,
}

/// Per-metric statistics over every reading at or after `since`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WindowStats {
    pub since: Option<DateTime<Utc>>,
    /// Total readings in the window
    pub count: usize,
    pub columns: BTreeMap<Metric, ColumnStats>,
}

impl WindowStats {
    /// Stats for a metric; an unrequested metric reads as empty
    pub fn column(&self, metric: Metric) -> ColumnStats {
        self.columns.get(&metric).copied().unwrap_or(ColumnStats {
            count: self.count,
            ..Default::default()
        })
    }

    pub fn avg(&self, metric: Metric) -> Option<f64> {
        self.column(metric).avg
    }
}

/// Running accumulator for one metric
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    min: f64,
    max: f64,
    samples: usize,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            sum: 0.0,
            min: f64::MAX,
            max: f64::MIN,
            samples: 0,
        }
    }

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.samples += 1;
    }

    fn finish(self, count: usize) -> ColumnStats {
        if self.samples == 0 {
            return ColumnStats {
                count,
                ..Default::default()
            };
        }
        ColumnStats {
            avg: Some(self.sum / self.samples as f64),
            min: Some(self.min),
            max: Some(self.max),
            count,
            samples: self.samples,
        }
    }
}

/// Aggregate `metrics` over readings with `timestamp >= since`.
///
/// Each metric is computed independently: a reading missing one metric still
/// counts toward the others. A metric with no present values reports
/// absent avg/min/max.
pub fn aggregate<R: Reading>(store: &[R], since: DateTime<Utc>, metrics: &[Metric]) -> WindowStats {
    let mut count = 0usize;
    let mut accumulators: BTreeMap<Metric, Accumulator> =
        metrics.iter().map(|m| (*m, Accumulator::new())).collect();

    for reading in store.iter().filter(|r| r.timestamp() >= since) {
        count += 1;
        for (metric, acc) in accumulators.iter_mut() {
            if let Some(value) = reading.metric(*metric).filter(|v| v.is_finite()) {
                acc.push(value);
            }
        }
    }

    WindowStats {
        since: Some(since),
        count,
        columns: accumulators
            .into_iter()
            .map(|(m, acc)| (m, acc.finish(count)))
            .collect(),
    }
}

/// [`aggregate`] per group. Groups with no reading in the window are absent.
pub fn aggregate_by<R, K, G>(
    store: &[R],
    since: DateTime<Utc>,
    metrics: &[Metric],
    group_key: G,
) -> BTreeMap<K, WindowStats>
where
    R: Reading + Clone,
    K: Ord,
    G: Fn(&R) -> K,
{
    let mut groups: BTreeMap<K, Vec<R>> = BTreeMap::new();
    for reading in store.iter().filter(|r| r.timestamp() >= since) {
        groups.entry(group_key(reading)).or_default().push(reading.clone());
    }

    groups
        .into_iter()
        .map(|(key, readings)| (key, aggregate(&readings, since, metrics)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use telemetry::{AirQualityReading, Pollutant, PollutantLevels, SensorReading};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 14, 0, 0, 0).unwrap()
    }

    fn air(id: i64, hours: i64, aqi: Option<i64>, pm25: Option<f64>, no2: Option<f64>) -> AirQualityReading {
        let mut levels = PollutantLevels::default();
        levels.set(Pollutant::Pm25, pm25);
        levels.set(Pollutant::No2, no2);
        AirQualityReading {
            id,
            timestamp: base() + Duration::hours(hours),
            city: "Paris".to_string(),
            station_name: "Paris".to_string(),
            aqi,
            levels,
            raw_data: None,
        }
    }

    #[test]
    fn test_window_selection_and_stats() {
        let store = vec![
            air(1, 0, Some(40), Some(10.0), None),
            air(2, 5, Some(60), Some(20.0), Some(30.0)),
            air(3, 6, Some(80), Some(30.0), None),
        ];

        let stats = aggregate(&store, base() + Duration::hours(5), &[Metric::Pm25, Metric::Aqi, Metric::No2]);
        assert_eq!(stats.count, 2);

        let pm25 = stats.column(Metric::Pm25);
        assert_eq!(pm25.avg, Some(25.0));
        assert_eq!(pm25.min, Some(20.0));
        assert_eq!(pm25.max, Some(30.0));
        assert_eq!(pm25.samples, 2);

        let no2 = stats.column(Metric::No2);
        assert_eq!(no2.avg, Some(30.0));
        assert_eq!(no2.samples, 1);
        assert_eq!(no2.count, 2);

        assert_eq!(stats.avg(Metric::Aqi), Some(70.0));
    }

    #[test]
    fn test_absent_column_reports_absent() {
        let store = vec![
            air(1, 0, Some(40), Some(10.0), None),
            air(2, 1, Some(50), None, None),
        ];

        let stats = aggregate(&store, base(), &[Metric::No2, Metric::Pm25]);
        assert_eq!(stats.count, 2);

        let no2 = stats.column(Metric::No2);
        assert_eq!(no2.avg, None);
        assert_eq!(no2.min, None);
        assert_eq!(no2.max, None);
        assert_eq!(no2.count, 2);

        // the reading without pm25 still counts toward the window
        assert_eq!(stats.column(Metric::Pm25).samples, 1);
    }

    #[test]
    fn test_empty_store() {
        let store: Vec<AirQualityReading> = Vec::new();
        let stats = aggregate(&store, base(), &[Metric::Pm25]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.avg(Metric::Pm25), None);
    }

    #[test]
    fn test_sub_hour_and_multi_day_windows() {
        let store: Vec<_> = (0..(24 * 10))
            .map(|h| air(h + 1, h, Some(50), Some(h as f64), None))
            .collect();
        let end = base() + Duration::hours(24 * 10 - 1);

        let last_half_hour = aggregate(&store, end - Duration::minutes(30), &[Metric::Pm25]);
        assert_eq!(last_half_hour.count, 1);

        let last_week = aggregate(&store, end - Duration::days(7), &[Metric::Pm25]);
        assert_eq!(last_week.count, 24 * 7 + 1);
    }

    #[test]
    fn test_idempotent() {
        let store = vec![
            air(1, 0, Some(40), Some(10.0), None),
            air(2, 1, None, Some(12.0), Some(8.0)),
        ];
        let a = aggregate(&store, base(), &Metric::ALL);
        let b = aggregate(&store, base(), &Metric::ALL);
        assert_eq!(a, b);
    }

    #[test]
    fn test_aggregate_by_zone() {
        let sensor = |id: i64, zone: &str, hours: i64, pm25: f64| SensorReading {
            id,
            timestamp: base() + Duration::hours(hours),
            sensor_id: format!("S{id}"),
            location_name: zone.to_string(),
            location_lat: None,
            location_lon: None,
            levels: PollutantLevels::default().with(Pollutant::Pm25, pm25),
            temperature: None,
            humidity: None,
            status: "active".to_string(),
        };
        let store = vec![
            sensor(1, "Centre-ville", 1, 10.0),
            sensor(2, "Centre-ville", 2, 30.0),
            sensor(3, "Est Paris", 2, 50.0),
            sensor(4, "Nord Paris", 0, 70.0),
        ];

        let zones = aggregate_by(&store, base() + Duration::hours(1), &[Metric::Pm25], |r| {
            r.location_name.clone()
        });
        assert_eq!(zones.len(), 2);
        assert_eq!(zones["Centre-ville"].count, 2);
        assert_eq!(zones["Centre-ville"].avg(Metric::Pm25), Some(20.0));
        assert_eq!(zones["Est Paris"].avg(Metric::Pm25), Some(50.0));
        assert!(!zones.contains_key("Nord Paris"));
    }
}
