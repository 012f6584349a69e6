//! Alert Evaluator Implementation

use chrono::{DateTime, Utc};
use telemetry::{Pollutant, PollutantLevels};
use tracing::{debug, info};

use crate::{Alert, AlertStatus, Severity, ThresholdTable, ZonePopulations};

/// Ratio of the threshold at which a breach becomes critical
pub const CRITICAL_RATIO: f64 = 1.5;
/// Ratio of the threshold at which monitoring starts
pub const MODERATE_RATIO: f64 = 0.8;

/// Map a value to its tier. Lower bounds are inclusive and tiers are tested
/// from the most severe down, so `1.5 * t` is critical and `t` is elevated.
pub fn classify(value: f64, threshold: f64) -> Option<Severity> {
    if value >= threshold * CRITICAL_RATIO {
        Some(Severity::Critical)
    } else if value >= threshold {
        Some(Severity::Elevated)
    } else if value >= threshold * MODERATE_RATIO {
        Some(Severity::Moderate)
    } else {
        None
    }
}

fn message(pollutant: Pollutant, severity: Severity, value: f64, threshold: f64) -> String {
    let name = pollutant.display_name();
    match severity {
        Severity::Critical => format!(
            "Very high {} level: {} µg/m³ (threshold: {} µg/m³). Emergency measures recommended.",
            name, value, threshold
        ),
        Severity::Elevated => format!(
            "High {} level: {} µg/m³ (threshold: {} µg/m³). Avoid intense outdoor activity.",
            name, value, threshold
        ),
        Severity::Moderate => format!(
            "{} level near threshold: {} µg/m³ (threshold: {} µg/m³). Increased monitoring recommended.",
            name, value, threshold
        ),
    }
}

/// Stateless evaluator over borrowed configuration tables
pub struct AlertEvaluator<'a> {
    thresholds: &'a ThresholdTable,
    populations: &'a ZonePopulations,
}

impl<'a> AlertEvaluator<'a> {
    pub fn new(thresholds: &'a ThresholdTable, populations: &'a ZonePopulations) -> Self {
        Self {
            thresholds,
            populations,
        }
    }

    /// Evaluate one reading snapshot for a zone.
    ///
    /// Absent values and pollutants without a threshold are skipped. Every
    /// returned alert is `active` and unsaved (`id == 0`).
    pub fn evaluate(&self, zone: &str, levels: &PollutantLevels, at: DateTime<Utc>) -> Vec<Alert> {
        let population = self.populations.population(zone);

        let alerts: Vec<Alert> = levels
            .iter()
            .filter_map(|(pollutant, value)| {
                let Some(threshold) = self.thresholds.get(pollutant) else {
                    debug!("No threshold for {}, skipping", pollutant);
                    return None;
                };
                let severity = classify(value, threshold)?;

                Some(Alert {
                    id: 0,
                    timestamp: at,
                    pollutant,
                    kind: pollutant.display_name().to_string(),
                    zone: zone.to_string(),
                    severity,
                    message: message(pollutant, severity, value, threshold),
                    value,
                    threshold,
                    population,
                    status: AlertStatus::Active,
                })
            })
            .collect();

        if !alerts.is_empty() {
            info!("{} alert(s) raised for zone {}", alerts.len(), zone);
        }
        alerts
    }
}
