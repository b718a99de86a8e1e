//! Safety thresholds and display band boundaries.

/// Classification thresholds, fixed for the lifetime of the process.
///
/// The critical bounds gate the stabilization trigger; the low/optimal
/// bounds only delimit the informational display bands. Defaults mirror
/// the values the actuation firmware uses.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Temperature below this is critical.
    pub temp_critical_low: f64,
    /// Upper edge of the "low" temperature band (exclusive).
    pub temp_low: f64,
    /// Upper edge of the "optimal" temperature band (inclusive).
    pub temp_optimal: f64,
    /// Temperature above this is critical.
    pub temp_critical_high: f64,
    /// Humidity below this is critical.
    pub hum_critical_low: f64,
    /// Upper edge of the "low" humidity band (exclusive).
    pub hum_low: f64,
    /// Upper edge of the "optimal" humidity band (inclusive).
    pub hum_optimal: f64,
    /// Humidity above this is critical.
    pub hum_critical_high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temp_critical_low: 10.0,
            temp_low: 15.0,
            temp_optimal: 25.0,
            temp_critical_high: 30.0,
            hum_critical_low: 20.0,
            hum_low: 40.0,
            hum_optimal: 60.0,
            hum_critical_high: 80.0,
        }
    }
}
