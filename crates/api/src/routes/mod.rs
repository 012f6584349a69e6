//! Route handlers

pub mod alerts;
pub mod dashboard;
pub mod health;
pub mod predictions;
pub mod reports;
pub mod sensors;
pub mod statistics;
pub mod zones;

use serde::Serialize;

/// `{"success": true, "data": ...}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
