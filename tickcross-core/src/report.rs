//! Live session stats and the periodic P/L reporter.
//!
//! The session controller is the only writer of `LiveStats`; it publishes
//! after every handled event. Readers get a snapshot built from independent
//! relaxed atomic loads, so a report may lag the session by one event.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::risk::{SessionOutcome, SessionStats};

/// Scalar session counters readable from any thread.
#[derive(Debug, Default)]
pub struct LiveStats {
    session_id: AtomicU64,
    trade_count: AtomicU64,
    pnl_bits: AtomicU64,
    balance_bits: AtomicU64,
    outcome: AtomicU8,
}

/// Point-in-time copy of `LiveStats`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LiveSnapshot {
    pub session_id: u64,
    pub trade_count: u64,
    pub pnl: f64,
    pub balance: f64,
    pub outcome: SessionOutcome,
}

impl LiveStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, session_id: u64, stats: &SessionStats, outcome: SessionOutcome) {
        self.session_id.store(session_id, Ordering::Relaxed);
        self.trade_count
            .store(u64::from(stats.trade_count), Ordering::Relaxed);
        self.pnl_bits
            .store(stats.realized_pnl.to_bits(), Ordering::Relaxed);
        self.balance_bits
            .store(stats.balance.to_bits(), Ordering::Relaxed);
        self.outcome.store(outcome.code(), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LiveSnapshot {
        LiveSnapshot {
            session_id: self.session_id.load(Ordering::Relaxed),
            trade_count: self.trade_count.load(Ordering::Relaxed),
            pnl: f64::from_bits(self.pnl_bits.load(Ordering::Relaxed)),
            balance: f64::from_bits(self.balance_bits.load(Ordering::Relaxed)),
            outcome: SessionOutcome::from_code(self.outcome.load(Ordering::Relaxed))
                .unwrap_or_default(),
        }
    }
}

/// Running reporter thread. Stops on `stop()` or drop.
pub struct ReporterHandle {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ReporterHandle {
    /// Signal the reporter and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender wakes the reporter immediately.
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ReporterHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawn a named thread that logs a live P/L line every `interval`.
pub fn spawn_reporter(
    stats: Arc<LiveStats>,
    interval: Duration,
) -> std::io::Result<ReporterHandle> {
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let handle = thread::Builder::new()
        .name("tickcross-reporter".into())
        .spawn(move || loop {
            let snap = stats.snapshot();
            info!(
                session = snap.session_id,
                pnl = snap.pnl,
                balance = snap.balance,
                trades = snap.trade_count,
                outcome = %snap.outcome,
                "live profit"
            );
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        })?;

    Ok(ReporterHandle {
        stop_tx: Some(stop_tx),
        handle: Some(handle),
    })
}
