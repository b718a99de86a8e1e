//! Stabilization session controller.
//!
//! Owns the trigger contract: verify the cached snapshot classifies as
//! critical, claim the shared record, suspend the poller, issue the
//! single long-running `POST /stabilize` call, reconcile its response
//! into the session, and resume the poller. Rejected triggers are
//! side-effect-free -- the session is untouched and no remote request is
//! issued.

use std::sync::Arc;

use tokio::sync::broadcast;

use ambient_core::classify::classify;
use ambient_core::metrics::Metrics;
use ambient_core::thresholds::Thresholds;
use ambient_telemetry::api::{TelemetryApi, TelemetryApiError};
use ambient_telemetry::messages::{StabilizeResponse, ValuePair};

use crate::events::ControlEvent;
use crate::poller::MetricsPoller;
use crate::session::{SessionStatus, StabilizationSession};
use crate::state::ControlState;

/// Surfaced when the stabilize call never produced a usable response.
pub const STABILIZE_ERROR_MESSAGE: &str = "stabilization request failed";

/// Why a trigger was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TriggerRejection {
    /// The cached snapshot does not classify as critical, or readings are
    /// missing. There is nothing to correct.
    #[error("readings are not in a critical state")]
    NotCritical,

    /// A stabilization session is already in progress.
    #[error("a stabilization session is already in progress")]
    SessionActive,

    /// Another operation (a fetch or another trigger) currently owns the
    /// shared record.
    #[error("another operation is in progress")]
    Busy,
}

/// Drives one stabilization session at a time against the service.
pub struct StabilizationController {
    api: Arc<TelemetryApi>,
    state: Arc<ControlState>,
    poller: Arc<MetricsPoller>,
    event_tx: broadcast::Sender<ControlEvent>,
    thresholds: Thresholds,
}

impl StabilizationController {
    pub fn new(
        api: Arc<TelemetryApi>,
        state: Arc<ControlState>,
        poller: Arc<MetricsPoller>,
        event_tx: broadcast::Sender<ControlEvent>,
    ) -> Self {
        Self {
            api,
            state,
            poller,
            event_tx,
            thresholds: Thresholds::default(),
        }
    }

    /// Run one stabilization session to its terminal status.
    ///
    /// Returns the terminal session snapshot -- including `Failed`, which
    /// is a completed cycle, not a rejection -- or a [`TriggerRejection`]
    /// when the preconditions do not hold. The remote call has no
    /// client-side timeout; the session owns the shared record until the
    /// service answers.
    pub async fn trigger(&self) -> Result<StabilizationSession, TriggerRejection> {
        let _guard = self
            .state
            .begin_operation()
            .ok_or(TriggerRejection::Busy)?;

        let pre_trigger = {
            let record = self.state.read().await;
            if record.session.status == SessionStatus::Stabilizing {
                return Err(TriggerRejection::SessionActive);
            }
            let Some(metrics) = record.poller.last_metrics.clone() else {
                return Err(TriggerRejection::NotCritical);
            };
            if !classify(&metrics, &self.thresholds).critical {
                return Err(TriggerRejection::NotCritical);
            }
            metrics
        };

        // The record is ours; poll ticks stay out until the session ends.
        self.poller.suspend().await;

        {
            let mut record = self.state.write().await;
            record.session = StabilizationSession::begin(Some(pre_trigger.clone()));
        }
        let _ = self.event_tx.send(ControlEvent::StabilizationStarted);
        tracing::info!(
            temperature = ?pre_trigger.temperature,
            humidity = ?pre_trigger.humidity,
            "Stabilization session started",
        );

        let result = self.api.stabilize().await;
        let outcome = reconcile(&pre_trigger, result);

        let session = {
            let mut record = self.state.write().await;
            record.session = outcome.session;
            if let Some(metrics) = outcome.new_metrics {
                // Final step readings replace the cached snapshot; no
                // confirming fetch is issued.
                record.poller.last_metrics = Some(metrics);
                record.poller.last_error = None;
            }
            record.session.clone()
        };

        self.report(&session);
        drop(_guard);
        self.poller.resume().await;

        Ok(session)
    }

    // ---- private helpers ----

    /// Log the terminal status and broadcast the matching event.
    fn report(&self, session: &StabilizationSession) {
        match session.status {
            SessionStatus::Completed => {
                let total_steps = session.total_steps.unwrap_or(session.steps.len() as u32);
                tracing::info!(total_steps, "Stabilization completed");
                let _ = self
                    .event_tx
                    .send(ControlEvent::StabilizationCompleted { total_steps });
            }
            SessionStatus::NoActionNeeded => {
                let message = session.messages.first().cloned();
                tracing::info!(message = ?message, "Stabilization not needed");
                let _ = self
                    .event_tx
                    .send(ControlEvent::StabilizationSkipped { message });
            }
            SessionStatus::Failed => {
                let error = session
                    .last_error
                    .clone()
                    .unwrap_or_else(|| STABILIZE_ERROR_MESSAGE.to_string());
                tracing::error!(error = %error, "Stabilization failed");
                let _ = self
                    .event_tx
                    .send(ControlEvent::StabilizationFailed { error });
            }
            _ => {}
        }
    }
}

/// Outcome of reconciling a stabilize result into local state.
struct ReconcileOutcome {
    session: StabilizationSession,
    /// Replacement for the cached metrics, when the run produced one.
    new_metrics: Option<Metrics>,
}

/// Map the service's answer onto a terminal session record.
///
/// Pure function; scenario coverage lives in the tests below.
fn reconcile(
    pre_trigger: &Metrics,
    result: Result<StabilizeResponse, TelemetryApiError>,
) -> ReconcileOutcome {
    let mut session = StabilizationSession::begin(Some(pre_trigger.clone()));

    match result {
        Ok(resp) if !resp.stabilization_needed => {
            session.status = SessionStatus::NoActionNeeded;
            if let Some(message) = resp.message {
                session.messages.push(message);
            }
            ReconcileOutcome {
                session,
                new_metrics: None,
            }
        }
        Ok(resp) => {
            session.status = SessionStatus::Completed;
            session.initial_values = resp.initial_values.map(pair_to_metrics);
            session.target_values = resp.target_values.map(pair_to_metrics);
            if let Some(current) = resp.current_values {
                session.current_values = Some(pair_to_metrics(current));
            }
            session.steps = resp.steps;
            session.total_steps = resp.total_steps;
            session.messages = resp.messages;

            let new_metrics = session
                .steps
                .last()
                .map(|step| Metrics::new(step.temperature, step.humidity));
            if let Some(metrics) = &new_metrics {
                session.current_values = Some(metrics.clone());
            }

            ReconcileOutcome {
                session,
                new_metrics,
            }
        }
        Err(e) => {
            session.status = SessionStatus::Failed;
            session.last_error = Some(surface_error(&e));
            ReconcileOutcome {
                session,
                new_metrics: None,
            }
        }
    }
}

/// Error text retained in the session: the server's detail verbatim when
/// it supplied one, otherwise a generic message.
fn surface_error(error: &TelemetryApiError) -> String {
    match error {
        TelemetryApiError::Status { detail, .. } => detail.clone(),
        TelemetryApiError::Request(_) => STABILIZE_ERROR_MESSAGE.to_string(),
    }
}

fn pair_to_metrics(pair: ValuePair) -> Metrics {
    Metrics::new(pair.temperature, pair.humidity)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
