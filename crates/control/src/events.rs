//! Control-plane events emitted by the poller and the controller.
//!
//! Broadcast via a [`tokio::sync::broadcast`] channel to any interested
//! consumer -- the daemon logs them and drives its auto-trigger decision
//! off `MetricsUpdated`. Producers never block: lagging subscribers drop
//! old events.

use serde::Serialize;

use ambient_core::metrics::Metrics;

/// A state change in the control core.
#[derive(Debug, Clone, Serialize)]
pub enum ControlEvent {
    /// A fetch replaced the cached metrics snapshot.
    MetricsUpdated { metrics: Metrics },

    /// A fetch failed; the previous snapshot is retained.
    FetchFailed { error: String },

    /// A stabilization session entered the `Stabilizing` state.
    StabilizationStarted,

    /// The service performed adjustment steps and reported final values.
    StabilizationCompleted { total_steps: u32 },

    /// The service reported that no adjustment was needed.
    StabilizationSkipped { message: Option<String> },

    /// The stabilization run failed; the session records the error.
    StabilizationFailed { error: String },
}
