//! Deterministic criticality classification of metrics snapshots.
//!
//! Pure logic -- no I/O. The binary `critical` verdict gates the
//! stabilization trigger; the five-step display bands are informational
//! classification outputs and never gate anything.

use serde::Serialize;

use crate::metrics::Metrics;
use crate::thresholds::Thresholds;

/// A reading dimension that can violate its safe band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Temperature,
    Humidity,
}

/// Result of classifying one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    /// True when at least one present reading lies outside its safe band.
    pub critical: bool,
    /// The dimensions outside their safe band, temperature first.
    pub violated: Vec<Dimension>,
}

/// Classify a snapshot against the critical thresholds.
///
/// A snapshot with either reading absent is never critical -- insufficient
/// data must not trigger actuation.
pub fn classify(metrics: &Metrics, thresholds: &Thresholds) -> Verdict {
    let (Some(temp), Some(hum)) = (metrics.temperature, metrics.humidity) else {
        return Verdict {
            critical: false,
            violated: Vec::new(),
        };
    };

    let mut violated = Vec::new();
    if temp < thresholds.temp_critical_low || temp > thresholds.temp_critical_high {
        violated.push(Dimension::Temperature);
    }
    if hum < thresholds.hum_critical_low || hum > thresholds.hum_critical_high {
        violated.push(Dimension::Humidity);
    }

    Verdict {
        critical: !violated.is_empty(),
        violated,
    }
}

/// Display band for a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Band {
    CriticalLow,
    Low,
    Optimal,
    High,
    CriticalHigh,
}

/// Band a temperature reading falls into.
pub fn temperature_band(temperature: f64, thresholds: &Thresholds) -> Band {
    if temperature < thresholds.temp_critical_low {
        Band::CriticalLow
    } else if temperature < thresholds.temp_low {
        Band::Low
    } else if temperature <= thresholds.temp_optimal {
        Band::Optimal
    } else if temperature <= thresholds.temp_critical_high {
        Band::High
    } else {
        Band::CriticalHigh
    }
}

/// Band a humidity reading falls into.
pub fn humidity_band(humidity: f64, thresholds: &Thresholds) -> Band {
    if humidity < thresholds.hum_critical_low {
        Band::CriticalLow
    } else if humidity < thresholds.hum_low {
        Band::Low
    } else if humidity <= thresholds.hum_optimal {
        Band::Optimal
    } else if humidity <= thresholds.hum_critical_high {
        Band::High
    } else {
        Band::CriticalHigh
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
