//! Query Windows

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Dashboard / statistics window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
}

impl Period {
    /// Parse a period label; unknown labels fall back to 24h
    pub fn parse_or_default(label: &str) -> Self {
        match label.trim() {
            "1h" => Period::OneHour,
            "6h" => Period::SixHours,
            "24h" => Period::Day,
            "7d" => Period::Week,
            _ => Period::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneHour => "1h",
            Period::SixHours => "6h",
            Period::Day => "24h",
            Period::Week => "7d",
        }
    }

    pub fn hours(&self) -> i64 {
        match self {
            Period::OneHour => 1,
            Period::SixHours => 6,
            Period::Day => 24,
            Period::Week => 168,
        }
    }

    /// Start of the window ending at `now`
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::hours(self.hours())
    }
}

/// Report window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl ReportPeriod {
    /// Parse a report period; French labels are accepted, unknown is daily
    pub fn parse_or_default(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "daily" | "quotidien" => ReportPeriod::Daily,
            "weekly" | "hebdomadaire" => ReportPeriod::Weekly,
            "monthly" | "mensuel" => ReportPeriod::Monthly,
            _ => ReportPeriod::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Daily => "daily",
            ReportPeriod::Weekly => "weekly",
            ReportPeriod::Monthly => "monthly",
        }
    }

    pub fn hours(&self) -> i64 {
        match self {
            ReportPeriod::Daily => 24,
            ReportPeriod::Weekly => 168,
            ReportPeriod::Monthly => 720,
        }
    }

    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::hours(self.hours())
    }
}
