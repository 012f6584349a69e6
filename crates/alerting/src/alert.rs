//! Alert Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use telemetry::Pollutant;

use crate::AlertingError;

/// Alert severity tiers, in ascending order of severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Moderate,
    Elevated,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Moderate => "Moderate",
            Severity::Elevated => "Elevated",
            Severity::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = AlertingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Moderate" => Ok(Severity::Moderate),
            "Elevated" => Ok(Severity::Elevated),
            "Critical" => Ok(Severity::Critical),
            other => Err(AlertingError::UnknownSeverity(other.to_string())),
        }
    }
}

/// Alert lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
    Dismissed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Resolved => "resolved",
            AlertStatus::Dismissed => "dismissed",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = AlertingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(AlertStatus::Active),
            "resolved" => Ok(AlertStatus::Resolved),
            "dismissed" => Ok(AlertStatus::Dismissed),
            _ => Err(AlertingError::UnknownStatus(s.to_string())),
        }
    }
}

/// A threshold breach raised for one pollutant in one zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Storage id, 0 until persisted
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub pollutant: Pollutant,
    /// Display label of the pollutant
    #[serde(rename = "type")]
    pub kind: String,
    pub zone: String,
    #[serde(rename = "level")]
    pub severity: Severity,
    pub message: String,
    pub value: f64,
    pub threshold: f64,
    pub population: u32,
    pub status: AlertStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Moderate < Severity::Elevated);
        assert!(Severity::Elevated < Severity::Critical);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Resolved".parse::<AlertStatus>().unwrap(), AlertStatus::Resolved);
        assert_eq!("active".parse::<AlertStatus>().unwrap(), AlertStatus::Active);
        assert!("closed".parse::<AlertStatus>().is_err());
    }

    #[test]
    fn test_severity_parse_round_trip() {
        for s in [Severity::Moderate, Severity::Elevated, Severity::Critical] {
            assert_eq!(s.as_str().parse::<Severity>().unwrap(), s);
        }
    }
}
