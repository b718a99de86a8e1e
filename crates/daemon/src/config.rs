//! Daemon configuration loaded from environment variables.

use std::time::Duration;

/// Default service address for local development.
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default interval between metric fetches.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// Runtime configuration for the daemon.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Base address of the Telemetry & Actuation Service.
    pub base_url: String,
    /// Interval between metric fetches.
    pub poll_interval: Duration,
    /// Trigger stabilization automatically when a snapshot is critical.
    pub auto_stabilize: bool,
}

impl DaemonConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                 |
    /// |----------------------|-------------------------|
    /// | `SERVICE_BASE_URL`   | `http://localhost:8000` |
    /// | `POLL_INTERVAL_SECS` | `15`                    |
    /// | `AUTO_STABILIZE`     | `true`                  |
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("SERVICE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

        let auto_stabilize = std::env::var("AUTO_STABILIZE")
            .map(|v| !matches!(v.trim(), "false" | "0" | "no"))
            .unwrap_or(true);

        Self {
            base_url,
            poll_interval: Duration::from_secs(poll_interval_secs),
            auto_stabilize,
        }
    }
}
