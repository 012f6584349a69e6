//! Threshold Table and Zone Populations
//!
//! Both tables are built once at start-up (defaults overlaid by
//! configuration) and then only read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use telemetry::Pollutant;

use crate::AlertingError;

/// Population used for zones missing from the lookup table
pub const DEFAULT_POPULATION: u32 = 10_000;

/// Pollutant alert limits (µg/m³)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct ThresholdTable {
    limits: BTreeMap<Pollutant, f64>,
}

impl ThresholdTable {
    /// An empty table: nothing will ever alert
    pub fn empty() -> Self {
        Self {
            limits: BTreeMap::new(),
        }
    }

    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        self.limits.get(&pollutant).copied()
    }

    pub fn contains(&self, pollutant: Pollutant) -> bool {
        self.limits.contains_key(&pollutant)
    }

    /// Set or replace a limit. Non-positive or non-finite limits are rejected.
    pub fn with_limit(mut self, pollutant: Pollutant, limit: f64) -> Result<Self, AlertingError> {
        if !limit.is_finite() || limit <= 0.0 {
            return Err(AlertingError::InvalidThreshold {
                pollutant: pollutant.to_string(),
                value: limit,
            });
        }
        self.limits.insert(pollutant, limit);
        Ok(self)
    }

    pub fn without(mut self, pollutant: Pollutant) -> Self {
        self.limits.remove(&pollutant);
        self
    }

    /// Overlay another table on top of this one
    pub fn merged(mut self, overrides: &ThresholdTable) -> Self {
        for (p, v) in &overrides.limits {
            self.limits.insert(*p, *v);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        self.limits.iter().map(|(p, v)| (*p, *v))
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        let limits = BTreeMap::from([
            (Pollutant::Pm25, 50.0),
            (Pollutant::Pm10, 80.0),
            (Pollutant::No2, 40.0),
            (Pollutant::O3, 120.0),
            (Pollutant::So2, 125.0),
            (Pollutant::Co, 10_000.0),
            (Pollutant::Nh3, 200.0),
        ]);
        Self { limits }
    }
}

impl TryFrom<BTreeMap<String, f64>> for ThresholdTable {
    type Error = AlertingError;

    fn try_from(raw: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        raw.into_iter().try_fold(ThresholdTable::empty(), |table, (name, limit)| {
            let pollutant = name
                .parse::<Pollutant>()
                .map_err(|_| AlertingError::UnknownPollutant(name.clone()))?;
            table.with_limit(pollutant, limit)
        })
    }
}

impl From<ThresholdTable> for BTreeMap<String, f64> {
    fn from(table: ThresholdTable) -> Self {
        table
            .limits
            .into_iter()
            .map(|(p, v)| (p.as_str().to_string(), v))
            .collect()
    }
}

/// Zone name to resident population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonePopulations {
    #[serde(default)]
    pub populations: BTreeMap<String, u32>,
    #[serde(default = "default_population")]
    pub fallback: u32,
}

fn default_population() -> u32 {
    DEFAULT_POPULATION
}

impl ZonePopulations {
    /// Population of a zone, or the fallback for unknown zones
    pub fn population(&self, zone: &str) -> u32 {
        self.populations.get(zone).copied().unwrap_or(self.fallback)
    }

    pub fn with_zone(mut self, zone: impl Into<String>, population: u32) -> Self {
        self.populations.insert(zone.into(), population);
        self
    }
}

impl Default for ZonePopulations {
    fn default() -> Self {
        let populations = [
            ("Zone Industrielle", 15_000),
            ("Centre-ville", 25_000),
            ("Résidentiel Nord", 12_000),
            ("Nord Paris", 15_000),
            ("Est Paris", 18_000),
        ]
        .into_iter()
        .map(|(z, p)| (z.to_string(), p))
        .collect();

        Self {
            populations,
            fallback: DEFAULT_POPULATION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let table = ThresholdTable::default();
        assert_eq!(table.len(), 7);
        assert_eq!(table.get(Pollutant::Pm25), Some(50.0));
        assert_eq!(table.get(Pollutant::Co), Some(10_000.0));
        assert_eq!(table.get(Pollutant::Nh3), Some(200.0));
    }

    #[test]
    fn test_deserialize_from_map() {
        let table: ThresholdTable = serde_json::from_str(r#"{"pm25": 25, "o3": 100}"#).unwrap();
        assert_eq!(table.get(Pollutant::Pm25), Some(25.0));
        assert_eq!(table.get(Pollutant::O3), Some(100.0));
        assert!(!table.contains(Pollutant::No2));
    }

    #[test]
    fn test_rejects_unknown_pollutant_and_bad_limits() {
        assert!(serde_json::from_str::<ThresholdTable>(r#"{"benzene": 5}"#).is_err());
        assert!(serde_json::from_str::<ThresholdTable>(r#"{"pm25": 0}"#).is_err());
        assert!(ThresholdTable::empty().with_limit(Pollutant::Co, f64::NAN).is_err());
    }

    #[test]
    fn test_merge_overrides() {
        let overrides = ThresholdTable::empty().with_limit(Pollutant::Pm25, 35.0).unwrap();
        let table = ThresholdTable::default().merged(&overrides);
        assert_eq!(table.get(Pollutant::Pm25), Some(35.0));
        assert_eq!(table.get(Pollutant::Pm10), Some(80.0));
    }

    #[test]
    fn test_population_fallback() {
        let zones = ZonePopulations::default();
        assert_eq!(zones.population("Centre-ville"), 25_000);
        assert_eq!(zones.population("Zone Industrielle"), 15_000);
        assert_eq!(zones.population("Atlantis"), DEFAULT_POPULATION);
    }
}
