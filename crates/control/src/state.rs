//! Shared control state and the single-owner operation gate.
//!
//! The poller and the stabilization controller share one record of
//! `{PollerState, StabilizationSession}`. Exactly one operation -- a
//! scheduled fetch, a manual fetch, or a stabilization trigger -- may own
//! the record at a time; ownership is the guard returned by
//! [`ControlState::begin_operation`]. A generation counter invalidates
//! fetches that were in flight when the poller was suspended or stopped,
//! so a late result can never overwrite newer state.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ambient_core::metrics::Metrics;

use crate::session::StabilizationSession;

/// Poller bookkeeping, held inside the shared record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollerState {
    /// Most recent successful snapshot; kept stale-but-available across
    /// fetch failures.
    pub last_metrics: Option<Metrics>,
    /// A fetch is currently in flight.
    pub is_fetching: bool,
    /// Message of the most recent failure, cleared by the next success.
    pub last_error: Option<String>,
    /// The periodic loop is active.
    pub running: bool,
}

/// The combined mutable record shared by poller and controller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ControlRecord {
    pub poller: PollerState,
    pub session: StabilizationSession,
}

/// Owner of the shared record, the operation gate, and the fetch
/// generation counter. Created once and cloned into components as an
/// `Arc`.
pub struct ControlState {
    record: RwLock<ControlRecord>,
    gate: Mutex<()>,
    generation: AtomicU64,
}

impl ControlState {
    pub fn new() -> Self {
        Self {
            record: RwLock::new(ControlRecord::default()),
            gate: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Claim the record for one operation.
    ///
    /// Returns `None` when another operation currently owns it; the
    /// caller must back off without side effects. The claim is released
    /// when the guard drops.
    pub fn begin_operation(&self) -> Option<MutexGuard<'_, ()>> {
        self.gate.try_lock().ok()
    }

    /// Current generation stamp. Fetches record this value before issuing
    /// the remote read and discard their result if it has moved on.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Invalidate any in-flight fetch. Called on suspension and stop.
    pub fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Cloned snapshot of the current record.
    pub async fn snapshot(&self) -> ControlRecord {
        self.record.read().await.clone()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, ControlRecord> {
        self.record.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, ControlRecord> {
        self.record.write().await
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
