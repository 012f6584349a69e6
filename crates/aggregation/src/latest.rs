//! Latest-Reading Resolution

use std::collections::BTreeMap;
use telemetry::Reading;

/// Most recent reading per group.
///
/// `filter` runs before partitioning, so groups with no surviving readings
/// are simply absent. Within a group the highest `(timestamp, sequence)`
/// wins: on equal timestamps the most recently inserted reading is kept.
pub fn latest_by<'a, R, K, G, F>(store: &'a [R], group_key: G, filter: F) -> BTreeMap<K, &'a R>
where
    R: Reading,
    K: Ord,
    G: Fn(&R) -> K,
    F: Fn(&R) -> bool,
{
    let mut latest: BTreeMap<K, &'a R> = BTreeMap::new();

    for reading in store.iter().filter(|r| filter(*r)) {
        let key = group_key(reading);
        let newer = latest
            .get(&key)
            .map_or(true, |current| order_key(*current) < order_key(reading));
        if newer {
            latest.insert(key, reading);
        }
    }

    latest
}

fn order_key<R: Reading>(reading: &R) -> (chrono::DateTime<chrono::Utc>, i64) {
    (reading.timestamp(), reading.sequence())
}

/// Latest reading of every source
pub fn latest_per_source<R: Reading>(store: &[R]) -> BTreeMap<String, &R> {
    latest_by(store, |r| r.source_key().to_string(), |_| true)
}

/// Latest reading of every source located in `zone`
pub fn latest_in_zone<'a, R: Reading>(store: &'a [R], zone: &str) -> BTreeMap<String, &'a R> {
    latest_by(store, |r| r.source_key().to_string(), |r| r.zone() == zone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use telemetry::{PollutantLevels, SensorReading};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap()
    }

    fn reading(id: i64, sensor: &str, zone: &str, minutes: i64) -> SensorReading {
        SensorReading {
            id,
            timestamp: base() + Duration::minutes(minutes),
            sensor_id: sensor.to_string(),
            location_name: zone.to_string(),
            location_lat: None,
            location_lon: None,
            levels: PollutantLevels::default(),
            temperature: None,
            humidity: None,
            status: "active".to_string(),
        }
    }

    #[test]
    fn test_latest_per_source() {
        let store = vec![
            reading(1, "S1", "Centre-ville", 0),
            reading(2, "S2", "Nord Paris", 1),
            reading(3, "S1", "Centre-ville", 5),
            reading(4, "S2", "Nord Paris", 2),
            reading(5, "S1", "Centre-ville", 3),
        ];

        let latest = latest_per_source(&store);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest["S1"].id, 3);
        assert_eq!(latest["S2"].id, 4);
    }

    #[test]
    fn test_timestamp_tie_prefers_latest_insert() {
        let store = vec![
            reading(10, "S1", "Centre-ville", 0),
            reading(12, "S1", "Centre-ville", 0),
            reading(11, "S1", "Centre-ville", 0),
        ];

        let latest = latest_per_source(&store);
        assert_eq!(latest["S1"].id, 12);
    }

    #[test]
    fn test_zone_filter_omits_empty_groups() {
        let store = vec![
            reading(1, "S1", "Centre-ville", 0),
            reading(2, "S2", "Nord Paris", 0),
            reading(3, "S3", "Est Paris", 0),
        ];

        let latest = latest_in_zone(&store, "Nord Paris");
        assert_eq!(latest.len(), 1);
        assert!(latest.contains_key("S2"));

        assert!(latest_in_zone(&store, "Nowhere").is_empty());
    }

    #[test]
    fn test_empty_store() {
        let store: Vec<SensorReading> = Vec::new();
        assert!(latest_per_source(&store).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let store = vec![
            reading(1, "S1", "Centre-ville", 4),
            reading(2, "S1", "Centre-ville", 1),
            reading(3, "S2", "Centre-ville", 2),
        ];
        let first: Vec<i64> = latest_per_source(&store).values().map(|r| r.id).collect();
        let second: Vec<i64> = latest_per_source(&store).values().map(|r| r.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_group_key() {
        let store = vec![
            reading(1, "S1", "Centre-ville", 4),
            reading(2, "S2", "Centre-ville", 9),
            reading(3, "S3", "Est Paris", 2),
        ];
        let by_zone = latest_by(&store, |r| r.location_name.clone(), |_| true);
        assert_eq!(by_zone["Centre-ville"].id, 2);
        assert_eq!(by_zone["Est Paris"].id, 3);
    }

    proptest! {
        #[test]
        fn prop_one_entry_per_group_with_max_timestamp(
            rows in proptest::collection::vec((0usize..6, 0i64..500), 0..60)
        ) {
            let store: Vec<SensorReading> = rows
                .iter()
                .enumerate()
                .map(|(i, (g, m))| reading(i as i64 + 1, &format!("S{g}"), "Centre-ville", *m))
                .collect();

            let latest = latest_per_source(&store);
            let groups: std::collections::BTreeSet<_> =
                store.iter().map(|r| r.sensor_id.clone()).collect();
            prop_assert_eq!(latest.len(), groups.len());

            for (key, chosen) in &latest {
                let max_ts = store
                    .iter()
                    .filter(|r| &r.sensor_id == key)
                    .map(|r| r.timestamp)
                    .max()
                    .unwrap();
                prop_assert_eq!(chosen.timestamp, max_ts);
            }
        }
    }
}
