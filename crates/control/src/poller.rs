//! Periodic metrics polling.
//!
//! [`MetricsPoller`] owns the fetch loop: a `tokio::time::interval` tick
//! claims the shared record, fetches the latest snapshot from the
//! service, and reconciles it into state. The loop is suspended for the
//! whole duration of a stabilization session and resumed once the session
//! reaches a terminal status; the immediate first tick after a resume
//! provides the fresh post-session fetch. Fetch failures are never fatal
//! -- the stale snapshot is kept and the next tick retries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;

use ambient_core::metrics::Metrics;
use ambient_telemetry::api::{TelemetryApi, TelemetryApiError};

use crate::events::ControlEvent;
use crate::session::{SessionStatus, StabilizationSession};
use crate::state::ControlState;

/// Surfaced in state when a fetch fails; the log line carries the cause.
pub const FETCH_ERROR_MESSAGE: &str = "failed to fetch metrics from the telemetry service";

/// Bound on waiting for the loop task to exit after cancellation.
const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a fetch produced no state update.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Another operation currently owns the shared record. Two
    /// simultaneous remote reads are never issued.
    #[error("another operation is in progress")]
    Busy,

    /// The remote read failed; state keeps the previous snapshot.
    #[error(transparent)]
    Api(#[from] TelemetryApiError),

    /// The poller was stopped or suspended while this fetch was in
    /// flight; the result was discarded so newer state wins.
    #[error("fetch superseded by a concurrent state change")]
    Superseded,
}

/// Periodic metrics poller.
pub struct MetricsPoller {
    api: Arc<TelemetryApi>,
    state: Arc<ControlState>,
    event_tx: broadcast::Sender<ControlEvent>,
    /// Present while the periodic loop is running.
    task: Mutex<Option<PollTask>>,
    /// Interval of the most recent `start`, reused by `resume`.
    interval: Mutex<Option<Duration>>,
}

struct PollTask {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

impl MetricsPoller {
    pub fn new(
        api: Arc<TelemetryApi>,
        state: Arc<ControlState>,
        event_tx: broadcast::Sender<ControlEvent>,
    ) -> Self {
        Self {
            api,
            state,
            event_tx,
            task: Mutex::new(None),
            interval: Mutex::new(None),
        }
    }

    /// Begin periodic fetching. No-op when the loop is already running.
    /// The first tick fires immediately.
    pub async fn start(&self, interval: Duration) {
        let mut task = self.task.lock().await;
        if task.is_some() {
            tracing::debug!("Poller already running");
            return;
        }
        *self.interval.lock().await = Some(interval);

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.api),
            Arc::clone(&self.state),
            self.event_tx.clone(),
            interval,
            cancel.clone(),
        ));
        *task = Some(PollTask { cancel, handle });
        self.state.write().await.poller.running = true;

        tracing::info!(interval_secs = interval.as_secs(), "Metrics poller started");
    }

    /// Stop the periodic loop. Safe to call when not running. Any
    /// in-flight fetch result is discarded.
    pub async fn stop(&self) {
        let mut task = self.task.lock().await;
        let Some(running) = task.take() else {
            return;
        };

        // A fetch already past the gate must not write its result.
        self.state.bump_generation();
        running.cancel.cancel();
        let _ = tokio::time::timeout(STOP_JOIN_TIMEOUT, running.handle).await;

        self.state.write().await.poller.running = false;
        tracing::info!("Metrics poller stopped");
    }

    /// Suspend the loop for the duration of a stabilization session.
    pub async fn suspend(&self) {
        self.stop().await;
    }

    /// Resume after a session reached a terminal status. The immediate
    /// first tick performs the fresh post-session fetch. No-op when the
    /// poller was never started.
    pub async fn resume(&self) {
        let interval = *self.interval.lock().await;
        if let Some(interval) = interval {
            self.start(interval).await;
        }
    }

    /// Whether the periodic loop is currently active.
    pub async fn is_running(&self) -> bool {
        self.task.lock().await.is_some()
    }

    /// One immediate user-initiated fetch, independent of the periodic
    /// loop. Begins a new refresh cycle: any terminal session result is
    /// discarded. Rejected with [`FetchError::Busy`] when another
    /// operation owns the record.
    pub async fn fetch_now(&self) -> Result<Metrics, FetchError> {
        fetch_once(&self.api, &self.state, &self.event_tx, true).await
    }
}

/// The periodic loop: tick, fetch, reconcile, repeat until cancelled.
async fn run_loop(
    api: Arc<TelemetryApi>,
    state: Arc<ControlState>,
    event_tx: broadcast::Sender<ControlEvent>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Poller loop stopping");
                break;
            }
            _ = ticker.tick() => {
                match fetch_once(&api, &state, &event_tx, false).await {
                    Ok(_) => {}
                    Err(FetchError::Busy) => {
                        tracing::debug!("Tick skipped: record owned by another operation");
                    }
                    Err(FetchError::Superseded) => {
                        tracing::debug!("Tick result discarded: poller state changed mid-fetch");
                    }
                    Err(FetchError::Api(e)) => {
                        tracing::warn!(error = %e, "Scheduled metrics fetch failed");
                    }
                }
            }
        }
    }
}

/// One guarded fetch: claim the record, read from the service, reconcile.
///
/// `user_initiated` marks a manual refresh, which begins a new session
/// cycle; scheduled ticks leave the session untouched so a terminal
/// stabilization result stays visible until the user acts.
async fn fetch_once(
    api: &TelemetryApi,
    state: &ControlState,
    event_tx: &broadcast::Sender<ControlEvent>,
    user_initiated: bool,
) -> Result<Metrics, FetchError> {
    let _guard = state.begin_operation().ok_or(FetchError::Busy)?;
    let generation = state.generation();

    {
        let mut record = state.write().await;
        record.poller.is_fetching = true;
        if user_initiated {
            record.session = StabilizationSession::new();
            record.session.status = SessionStatus::Loading;
        }
    }

    let result = api.get_metrics().await;

    let mut record = state.write().await;
    record.poller.is_fetching = false;
    if user_initiated && record.session.status == SessionStatus::Loading {
        record.session.status = SessionStatus::Idle;
    }

    if state.generation() != generation {
        // Stopped or suspended while the read was in flight.
        return Err(FetchError::Superseded);
    }

    match result {
        Ok(reading) => {
            let metrics = reading.into_metrics();
            record.poller.last_metrics = Some(metrics.clone());
            record.poller.last_error = None;
            let _ = event_tx.send(ControlEvent::MetricsUpdated {
                metrics: metrics.clone(),
            });
            Ok(metrics)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Metrics fetch failed; keeping previous snapshot");
            record.poller.last_error = Some(FETCH_ERROR_MESSAGE.to_string());
            let _ = event_tx.send(ControlEvent::FetchFailed {
                error: FETCH_ERROR_MESSAGE.to_string(),
            });
            Err(FetchError::Api(e))
        }
    }
}
