//! One trading session: SMA tracker → signal detector → risk governor.
//!
//! A `Session` owns all mutable trading state. Nothing survives it: a new
//! session starts with an empty window, a neutral signal and zeroed stats.

pub mod controller;

pub use controller::{Flow, RunEnd, RunSummary, SessionController};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::domain::{ClosedTrade, Direction, PriceTick, TradeIntent};
use crate::indicators::{SmaPair, SmaTracker};
use crate::risk::{AdmissionResult, RiskGovernor, SessionOutcome, SessionStats};
use crate::signal::{SignalDetector, SignalState};

/// What one tick led to.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Dropped before reaching the window (wrong instrument or non-finite price).
    Ignored,
    /// Fewer ticks than the longer SMA period.
    Warmup,
    /// Averages available, no crossover edge.
    Hold(SmaPair),
    /// Crossover edge fired and went through admission.
    Signal {
        direction: Direction,
        averages: SmaPair,
        admission: AdmissionResult,
    },
}

#[derive(Debug, Clone)]
pub struct Session {
    id: u64,
    instrument: String,
    tracker: SmaTracker,
    detector: SignalDetector,
    governor: RiskGovernor,
    ticks_seen: u64,
}

impl Session {
    pub fn new(id: u64, config: &SessionConfig) -> Self {
        Self {
            id,
            instrument: config.instrument.clone(),
            tracker: SmaTracker::new(config.sma.short_period, config.sma.long_period),
            detector: SignalDetector::new(),
            governor: RiskGovernor::new(
                config.instrument.clone(),
                config.trade.clone(),
                config.risk.clone(),
            ),
            ticks_seen: 0,
        }
    }

    /// Feed one tick through the tracker, detector and (on an edge) governor.
    ///
    /// Admission time is the tick's own timestamp.
    pub fn on_tick(&mut self, tick: &PriceTick) -> TickOutcome {
        if tick.instrument != self.instrument {
            warn!(
                expected = %self.instrument,
                got = %tick.instrument,
                "tick for another instrument ignored"
            );
            return TickOutcome::Ignored;
        }
        if !tick.has_finite_price() {
            warn!(price = tick.price, "non-finite tick price ignored");
            return TickOutcome::Ignored;
        }

        self.ticks_seen += 1;
        self.tracker.observe(tick.price);
        let averages = self.tracker.averages();
        debug!(
            price = tick.price,
            short = ?averages.short,
            long = ?averages.long,
            "tick"
        );

        let evaluation = self.detector.evaluate(averages.short, averages.long);
        match evaluation.emitted() {
            Some(direction) => {
                let admission = self.governor.admit(direction, tick.timestamp);
                TickOutcome::Signal {
                    direction,
                    averages,
                    admission,
                }
            }
            None if averages.is_complete() => TickOutcome::Hold(averages),
            None => TickOutcome::Warmup,
        }
    }

    /// `None` when the result was dropped as non-finite.
    pub fn on_trade_result(&mut self, pnl: f64, closed_at: DateTime<Utc>) -> Option<ClosedTrade> {
        self.governor.record_result(pnl, closed_at)
    }

    /// Withdraw an admitted intent whose order submission failed.
    pub fn abandon_order(&mut self, intent: &TradeIntent) -> bool {
        self.governor.abandon(intent)
    }

    pub fn on_connected(&mut self, balance: f64) {
        self.governor.set_balance(balance);
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn signal_state(&self) -> SignalState {
        self.detector.state()
    }

    pub fn stats(&self) -> &SessionStats {
        self.governor.stats()
    }

    pub fn outcome(&self) -> SessionOutcome {
        self.governor.outcome()
    }

    pub fn tracker(&self) -> &SmaTracker {
        &self.tracker
    }

    pub fn governor(&self) -> &RiskGovernor {
        &self.governor
    }

    pub fn ticks_seen(&self) -> u64 {
        self.ticks_seen
    }
}
