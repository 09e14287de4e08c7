//! Session controller: drives sessions from a feed and routes their output.
//!
//! Per event:
//! - `Tick` → session; an admitted intent goes to the order sink, and is
//!   withdrawn from the open trades if submission fails
//! - `TradeResult` → session; the closed trade goes to the trade log,
//!   non-finite P/L is dropped
//! - `Connected` → seeds the session balance
//! - `Disconnected` → full teardown, fresh session (unless halted)
//!
//! The controller never blocks except inside `FeedSource::next_event`.
//! Sink and trade-log failures are logged and the session carries on.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use super::{Session, TickOutcome};
use crate::config::SessionConfig;
use crate::feed::{FeedEvent, FeedSource};
use crate::report::LiveStats;
use crate::risk::{AdmissionResult, SessionOutcome};
use crate::sink::{OrderSink, TradeLogSink};

/// Why `run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunEnd {
    /// The feed has no more events.
    FeedExhausted,
    /// The feed dropped after the session had halted; no new session is started.
    DisconnectedAfterHalt,
    /// The feed failed in a way it cannot recover from.
    FeedFailed,
}

/// Whether to keep pulling events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    End(RunEnd),
}

/// Counters across every session in one `run`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub sessions_started: u64,
    pub ticks_processed: u64,
    pub ticks_ignored: u64,
    pub signals: u64,
    pub admitted: u64,
    pub rejected_cooldown: u64,
    pub rejected_stopped: u64,
    pub submit_failures: u64,
    pub results_recorded: u64,
    pub unmatched_results: u64,
    pub results_dropped: u64,
    pub trade_log_failures: u64,
    pub feed_errors: u64,
    pub final_outcome: SessionOutcome,
    pub final_pnl: f64,
    pub final_trade_count: u32,
    pub final_balance: f64,
    pub end: RunEnd,
}

#[derive(Debug, Default)]
struct Counters {
    ticks_processed: u64,
    ticks_ignored: u64,
    signals: u64,
    admitted: u64,
    rejected_cooldown: u64,
    rejected_stopped: u64,
    submit_failures: u64,
    results_recorded: u64,
    unmatched_results: u64,
    results_dropped: u64,
    trade_log_failures: u64,
    feed_errors: u64,
}

pub struct SessionController<S, L> {
    config: SessionConfig,
    sink: S,
    trade_log: L,
    live: Arc<LiveStats>,
    session: Session,
    sessions_started: u64,
    counters: Counters,
}

impl<S: OrderSink, L: TradeLogSink> SessionController<S, L> {
    /// Create a controller with its first session already started.
    pub fn new(config: SessionConfig, sink: S, trade_log: L) -> Self {
        let live = Arc::new(LiveStats::new());
        let session = Session::new(1, &config);
        let controller = Self {
            config,
            sink,
            trade_log,
            live,
            session,
            sessions_started: 1,
            counters: Counters::default(),
        };
        controller.publish();
        controller
    }

    /// Tear down the current session and start a fresh one.
    pub fn new_session(&mut self) {
        self.sessions_started += 1;
        self.session = Session::new(self.sessions_started, &self.config);
        self.publish();
        info!(session = self.sessions_started, "new session started");
    }

    /// Pull events until the feed ends, fails, or drops after a halt.
    pub fn run<F: FeedSource + ?Sized>(&mut self, feed: &mut F) -> RunSummary {
        let end = loop {
            let event = match feed.next_event() {
                Ok(Some(event)) => event,
                Ok(None) => break RunEnd::FeedExhausted,
                Err(e) if e.is_recoverable() => {
                    self.counters.feed_errors += 1;
                    warn!(error = %e, "skipping malformed feed event");
                    continue;
                }
                Err(e) => {
                    self.counters.feed_errors += 1;
                    error!(error = %e, "feed failed");
                    break RunEnd::FeedFailed;
                }
            };

            if let Flow::End(end) = self.handle_event(event) {
                break end;
            }
        };

        let summary = self.summary(end);
        info!(
            sessions = summary.sessions_started,
            admitted = summary.admitted,
            pnl = summary.final_pnl,
            outcome = %summary.final_outcome,
            "run finished"
        );
        summary
    }

    /// Apply one event to the current session.
    pub fn handle_event(&mut self, event: FeedEvent) -> Flow {
        let flow = match event {
            FeedEvent::Tick(tick) => {
                let outcome = self.session.on_tick(&tick);
                self.route_tick(outcome);
                Flow::Continue
            }
            FeedEvent::TradeResult(result) => {
                match self.session.on_trade_result(result.pnl, result.closed_at) {
                    Some(closed) => {
                        self.counters.results_recorded += 1;
                        if !closed.matched {
                            self.counters.unmatched_results += 1;
                        }
                        if let Err(e) = self.trade_log.record(&closed) {
                            self.counters.trade_log_failures += 1;
                            error!(error = %e, "failed to write trade log");
                        }
                    }
                    None => self.counters.results_dropped += 1,
                }
                Flow::Continue
            }
            FeedEvent::Connected { balance, .. } => {
                info!(balance, session = self.session.id(), "feed connected");
                self.session.on_connected(balance);
                Flow::Continue
            }
            FeedEvent::Disconnected { reason, .. } => {
                if self.session.outcome().is_stopped() {
                    warn!(
                        %reason,
                        outcome = %self.session.outcome(),
                        "feed disconnected after halt"
                    );
                    Flow::End(RunEnd::DisconnectedAfterHalt)
                } else {
                    warn!(%reason, session = self.session.id(), "feed disconnected, resetting session");
                    self.new_session();
                    Flow::Continue
                }
            }
        };
        self.publish();
        flow
    }

    fn route_tick(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Ignored => self.counters.ticks_ignored += 1,
            TickOutcome::Warmup | TickOutcome::Hold(_) => self.counters.ticks_processed += 1,
            TickOutcome::Signal {
                direction,
                averages,
                admission,
            } => {
                self.counters.ticks_processed += 1;
                self.counters.signals += 1;
                info!(
                    %direction,
                    short = ?averages.short,
                    long = ?averages.long,
                    "crossover signal"
                );
                match admission {
                    AdmissionResult::Admitted(intent) => {
                        self.counters.admitted += 1;
                        if let Err(e) = self.sink.submit(&intent) {
                            self.counters.submit_failures += 1;
                            error!(error = %e, contract = intent.contract_type(), "order submission failed");
                            self.session.abandon_order(&intent);
                        }
                    }
                    AdmissionResult::RejectedCooldown(_) => self.counters.rejected_cooldown += 1,
                    AdmissionResult::RejectedStopped(_) => self.counters.rejected_stopped += 1,
                }
            }
        }
    }

    fn publish(&self) {
        self.live
            .publish(self.session.id(), self.session.stats(), self.session.outcome());
    }

    fn summary(&self, end: RunEnd) -> RunSummary {
        let stats = self.session.stats();
        RunSummary {
            sessions_started: self.sessions_started,
            ticks_processed: self.counters.ticks_processed,
            ticks_ignored: self.counters.ticks_ignored,
            signals: self.counters.signals,
            admitted: self.counters.admitted,
            rejected_cooldown: self.counters.rejected_cooldown,
            rejected_stopped: self.counters.rejected_stopped,
            submit_failures: self.counters.submit_failures,
            results_recorded: self.counters.results_recorded,
            unmatched_results: self.counters.unmatched_results,
            results_dropped: self.counters.results_dropped,
            trade_log_failures: self.counters.trade_log_failures,
            feed_errors: self.counters.feed_errors,
            final_outcome: self.session.outcome(),
            final_pnl: stats.realized_pnl,
            final_trade_count: stats.trade_count,
            final_balance: stats.balance,
            end,
        }
    }

    /// Shared handle for the live reporter.
    pub fn live_stats(&self) -> Arc<LiveStats> {
        Arc::clone(&self.live)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn sessions_started(&self) -> u64 {
        self.sessions_started
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn trade_log(&self) -> &L {
        &self.trade_log
    }
}
