//! `ambientd` -- environmental stabilization daemon.
//!
//! Polls the Telemetry & Actuation Service for temperature/humidity
//! readings and, when a snapshot falls outside its safe bands, drives the
//! remote multi-step stabilization procedure back to a normal state.
//!
//! # Environment variables
//!
//! | Variable             | Required | Default                 | Description                              |
//! |----------------------|----------|-------------------------|------------------------------------------|
//! | `SERVICE_BASE_URL`   | no       | `http://localhost:8000` | Telemetry & Actuation Service address    |
//! | `POLL_INTERVAL_SECS` | no       | `15`                    | Seconds between metric fetches           |
//! | `AUTO_STABILIZE`     | no       | `true`                  | Trigger stabilization on critical values |

mod config;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ambient_core::classify::classify;
use ambient_core::thresholds::Thresholds;
use ambient_control::controller::{StabilizationController, TriggerRejection};
use ambient_control::events::ControlEvent;
use ambient_control::poller::MetricsPoller;
use ambient_control::state::ControlState;
use ambient_telemetry::api::TelemetryApi;

use config::DaemonConfig;

/// Capacity of the control event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ambientd=info,ambient_control=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DaemonConfig::from_env();
    tracing::info!(
        base_url = %config.base_url,
        poll_interval_secs = config.poll_interval.as_secs(),
        auto_stabilize = config.auto_stabilize,
        "Starting ambientd",
    );

    let api = Arc::new(TelemetryApi::new(config.base_url.clone()));
    let state = Arc::new(ControlState::new());
    let (event_tx, mut events) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

    let poller = Arc::new(MetricsPoller::new(
        Arc::clone(&api),
        Arc::clone(&state),
        event_tx.clone(),
    ));
    let controller = Arc::new(StabilizationController::new(
        api,
        Arc::clone(&state),
        Arc::clone(&poller),
        event_tx,
    ));

    poller.start(config.poll_interval).await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
            event = events.recv() => match event {
                Ok(event) => handle_event(event, &config, &controller),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event consumer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    poller.stop().await;
    tracing::info!("ambientd stopped");
}

/// React to one control event: log it, and kick off a stabilization
/// session when a fresh snapshot classifies as critical.
fn handle_event(
    event: ControlEvent,
    config: &DaemonConfig,
    controller: &Arc<StabilizationController>,
) {
    match event {
        ControlEvent::MetricsUpdated { metrics } => {
            let verdict = classify(&metrics, &Thresholds::default());
            tracing::info!(
                temperature = ?metrics.temperature,
                humidity = ?metrics.humidity,
                critical = verdict.critical,
                "Metrics updated",
            );
            if verdict.critical && config.auto_stabilize {
                let controller = Arc::clone(controller);
                tokio::spawn(async move {
                    match controller.trigger().await {
                        Ok(session) => {
                            tracing::info!(status = ?session.status, "Stabilization session finished");
                        }
                        Err(TriggerRejection::Busy | TriggerRejection::SessionActive) => {
                            tracing::debug!("Trigger skipped: an operation is already running");
                        }
                        Err(TriggerRejection::NotCritical) => {
                            tracing::debug!("Trigger skipped: readings back in range");
                        }
                    }
                });
            }
        }
        ControlEvent::FetchFailed { error } => {
            tracing::warn!(%error, "Metrics fetch failed");
        }
        ControlEvent::StabilizationStarted => {
            tracing::info!("Stabilization started");
        }
        ControlEvent::StabilizationCompleted { total_steps } => {
            tracing::info!(total_steps, "Stabilization completed");
        }
        ControlEvent::StabilizationSkipped { message } => {
            tracing::info!(message = ?message, "Stabilization not needed");
        }
        ControlEvent::StabilizationFailed { error } => {
            tracing::error!(%error, "Stabilization failed");
        }
    }
}
