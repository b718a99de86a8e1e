//! Stabilization session record and its status machine.

use serde::Serialize;

use ambient_core::metrics::Metrics;
use ambient_telemetry::messages::StabilizationStep;

/// Lifecycle status of the current session.
///
/// A plain refresh cycle moves `Idle -> Loading -> Idle`. A stabilization
/// cycle moves `Idle -> Stabilizing -> {Completed | NoActionNeeded |
/// Failed}`. Terminal statuses persist until the next refresh or trigger
/// begins a new cycle and discards them; nothing clears them on a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Stabilizing,
    Completed,
    NoActionNeeded,
    Failed,
}

impl SessionStatus {
    /// Whether this status ends a stabilization cycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::NoActionNeeded | Self::Failed)
    }
}

/// The current stabilization session.
///
/// Created fresh on each trigger and replaced wholesale by the next
/// trigger or refresh. `steps` is produced entirely by the service in one
/// response and never mutated locally.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StabilizationSession {
    pub status: SessionStatus,
    /// Readings before the service started adjusting, as it reported them.
    pub initial_values: Option<Metrics>,
    /// Readings the service was steering towards.
    pub target_values: Option<Metrics>,
    /// Latest known readings for this session.
    pub current_values: Option<Metrics>,
    /// Step history, ordered by ascending step index.
    pub steps: Vec<StabilizationStep>,
    /// Step count as reported by the service; equals `steps.len()` when
    /// both are present.
    pub total_steps: Option<u32>,
    pub messages: Vec<String>,
    pub last_error: Option<String>,
}

impl StabilizationSession {
    /// Empty idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh session entering the `Stabilizing` state.
    ///
    /// Discards any prior result; `current_values` holds the pre-trigger
    /// snapshot until the run reports newer readings.
    pub fn begin(pre_trigger: Option<Metrics>) -> Self {
        Self {
            status: SessionStatus::Stabilizing,
            current_values: pre_trigger,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
