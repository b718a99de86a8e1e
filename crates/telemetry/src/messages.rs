//! Wire types for the Telemetry & Actuation Service.
//!
//! The service speaks plain JSON over HTTP: `GET /metrics` returns the
//! latest reading snapshot, `POST /stabilize` returns one
//! [`StabilizeResponse`] after the whole normalization run has finished.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ambient_core::metrics::Metrics;

/// Latest reading snapshot as returned by `GET /metrics`.
///
/// Either reading may be `null` when the upstream channel has no data.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsReading {
    pub humidity: Option<f64>,
    pub temperature: Option<f64>,
    /// RFC 3339 timestamp of the reading, if the service reports one.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl MetricsReading {
    /// Convert into the domain snapshot type.
    ///
    /// An unparseable `created_at` is dropped rather than failing the
    /// whole fetch.
    pub fn into_metrics(self) -> Metrics {
        let observed_at = self
            .created_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&Utc));

        Metrics {
            temperature: self.temperature,
            humidity: self.humidity,
            observed_at,
        }
    }
}

/// A temperature/humidity pair reported by the stabilizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuePair {
    pub temperature: f64,
    pub humidity: f64,
}

/// One adjustment performed during a stabilization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilizationStep {
    /// 1-based step index, strictly increasing within a run.
    pub step: u32,
    pub temperature: f64,
    pub humidity: f64,
    /// Upstream record id for the written entry, when the write succeeded.
    #[serde(default)]
    pub entry_id: Option<String>,
    /// Error reported for this step, if the write failed.
    #[serde(default)]
    pub error: Option<String>,
    /// Unix timestamp of the step, if reported.
    #[serde(default)]
    pub timestamp: Option<f64>,
}

/// Full response body of `POST /stabilize`.
///
/// The service decides whether any correction is needed; when it is, the
/// response carries the complete step history in one piece -- there is no
/// intermediate progress channel.
#[derive(Debug, Clone, Deserialize)]
pub struct StabilizeResponse {
    /// False when the readings were already inside their safe bands.
    pub stabilization_needed: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub initial_values: Option<ValuePair>,
    #[serde(default)]
    pub target_values: Option<ValuePair>,
    #[serde(default)]
    pub current_values: Option<ValuePair>,
    #[serde(default)]
    pub steps: Vec<StabilizationStep>,
    #[serde(default)]
    pub total_steps: Option<u32>,
    #[serde(default)]
    pub messages: Vec<String>,
}

/// Error body the service attaches to non-success responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
