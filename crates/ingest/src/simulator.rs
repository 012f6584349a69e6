//! IoT sensor network simulator

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use telemetry::{Pollutant, PollutantLevels, SensorReading};

/// A simulated sensor and where it is installed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSite {
    pub sensor_id: String,
    pub location_name: String,
    pub lat: f64,
    pub lon: f64,
}

impl SensorSite {
    pub fn new(sensor_id: &str, location_name: &str, lat: f64, lon: f64) -> Self {
        Self {
            sensor_id: sensor_id.to_string(),
            location_name: location_name.to_string(),
            lat,
            lon,
        }
    }
}

/// The three city sensors deployed by default
pub fn default_sites() -> Vec<SensorSite> {
    vec![
        SensorSite::new("SENSOR_01", "Centre-ville", 48.8566, 2.3522),
        SensorSite::new("SENSOR_02", "Nord Paris", 48.8606, 2.3376),
        SensorSite::new("SENSOR_03", "Est Paris", 48.8449, 2.3735),
    ]
}

fn one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Generates plausible readings for each configured site
pub struct SensorSimulator {
    sites: Vec<SensorSite>,
    rng: StdRng,
}

impl SensorSimulator {
    pub fn new(sites: Vec<SensorSite>, seed: u64) -> Self {
        Self {
            sites,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn sites(&self) -> &[SensorSite] {
        &self.sites
    }

    /// One reading per site, all stamped `at`
    pub fn sample(&mut self, at: DateTime<Utc>) -> Vec<SensorReading> {
        let rng = &mut self.rng;
        self.sites
            .iter()
            .map(|site| {
                let pm25 = one_decimal(rng.random_range(5.0..=75.0));
                let pm10 = one_decimal(pm25 * rng.random_range(1.3..=1.8));
                let levels = PollutantLevels::default()
                    .with(Pollutant::Pm25, pm25)
                    .with(Pollutant::Pm10, pm10)
                    .with(Pollutant::No2, one_decimal(rng.random_range(10.0..=60.0)))
                    .with(Pollutant::O3, one_decimal(rng.random_range(20.0..=150.0)))
                    .with(Pollutant::So2, one_decimal(rng.random_range(5.0..=140.0)))
                    .with(Pollutant::Co, one_decimal(rng.random_range(100.0..=15000.0)));

                SensorReading {
                    id: 0,
                    timestamp: at,
                    sensor_id: site.sensor_id.clone(),
                    location_name: site.location_name.clone(),
                    location_lat: Some(site.lat),
                    location_lon: Some(site.lon),
                    levels,
                    temperature: Some(one_decimal(rng.random_range(10.0..=28.0))),
                    humidity: Some(one_decimal(rng.random_range(35.0..=85.0))),
                    status: "active".to_string(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_range(v: Option<f64>, lo: f64, hi: f64) -> bool {
        v.is_some_and(|v| v >= lo && v <= hi)
    }

    #[test]
    fn test_one_reading_per_site() {
        let mut sim = SensorSimulator::new(default_sites(), 1);
        let now = Utc::now();
        let readings = sim.sample(now);

        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].sensor_id, "SENSOR_01");
        assert_eq!(readings[1].location_name, "Nord Paris");
        assert_eq!(readings[2].location_lat, Some(48.8449));
        assert!(readings.iter().all(|r| r.timestamp == now));
        assert!(readings.iter().all(|r| r.levels.nh3.is_none()));
    }

    #[test]
    fn test_values_within_ranges() {
        let mut sim = SensorSimulator::new(default_sites(), 99);
        for _ in 0..50 {
            for r in sim.sample(Utc::now()) {
                let pm25 = r.levels.pm25.unwrap();
                assert!((5.0..=75.0).contains(&pm25));
                assert!(in_range(r.levels.pm10, pm25 * 1.3 - 0.06, pm25 * 1.8 + 0.06));
                assert!(in_range(r.levels.no2, 10.0, 60.0));
                assert!(in_range(r.levels.o3, 20.0, 150.0));
                assert!(in_range(r.levels.so2, 5.0, 140.0));
                assert!(in_range(r.levels.co, 100.0, 15000.0));
                assert!(in_range(r.temperature, 10.0, 28.0));
                assert!(in_range(r.humidity, 35.0, 85.0));
                assert_eq!((pm25 * 10.0).round() / 10.0, pm25);
            }
        }
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let now = Utc::now();
        let a = SensorSimulator::new(default_sites(), 5).sample(now);
        let b = SensorSimulator::new(default_sites(), 5).sample(now);
        assert_eq!(a, b);
    }
}
