//! Environmental metrics snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One snapshot of temperature and humidity readings.
///
/// Either reading may be absent when the upstream channel has no data for
/// that field. Snapshots are immutable once produced and are replaced
/// wholesale by each successful fetch or stabilization completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// Temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// Relative humidity in percent.
    pub humidity: Option<f64>,
    /// When the reading was recorded upstream, if reported.
    pub observed_at: Option<DateTime<Utc>>,
}

impl Metrics {
    /// Snapshot with both readings present and no upstream timestamp.
    pub fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature: Some(temperature),
            humidity: Some(humidity),
            observed_at: None,
        }
    }
}
