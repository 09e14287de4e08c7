//! Risk governor: turns detector signals into trade intents, or refuses.
//!
//! Admission checks run in a fixed order:
//! 1. Already stopped → reject, no state change
//! 2. Trade count at `max_trades` → stop (MaxTrades)
//! 3. P/L at or below `stop_loss` → stop (StopLoss)
//! 4. P/L at or above `take_profit` → stop (TakeProfit)
//! 5. Inside cooldown → reject, no state change
//! 6. Otherwise admit, count the trade, start a new cooldown
//!
//! Thresholds are only evaluated here. A trade result that pushes P/L past a
//! threshold halts the session on the next signal, not on the result itself.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{RiskLimits, SessionStats};
use crate::config::TradeConfig;
use crate::domain::{ClosedTrade, Direction, TradeIntent};

/// Lifecycle of a session. Every `Stopped*` variant is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionOutcome {
    #[default]
    Running,
    StoppedMaxTrades,
    StoppedStopLoss,
    StoppedTakeProfit,
}

impl SessionOutcome {
    pub fn is_stopped(&self) -> bool {
        !matches!(self, SessionOutcome::Running)
    }

    /// Compact code for lock-free publishing.
    pub fn code(&self) -> u8 {
        match self {
            SessionOutcome::Running => 0,
            SessionOutcome::StoppedMaxTrades => 1,
            SessionOutcome::StoppedStopLoss => 2,
            SessionOutcome::StoppedTakeProfit => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SessionOutcome::Running),
            1 => Some(SessionOutcome::StoppedMaxTrades),
            2 => Some(SessionOutcome::StoppedStopLoss),
            3 => Some(SessionOutcome::StoppedTakeProfit),
            _ => None,
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::Running => write!(f, "Running"),
            SessionOutcome::StoppedMaxTrades => write!(f, "StoppedMaxTrades"),
            SessionOutcome::StoppedStopLoss => write!(f, "StoppedStopLoss"),
            SessionOutcome::StoppedTakeProfit => write!(f, "StoppedTakeProfit"),
        }
    }
}

/// Governor decision for one signal.
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionResult {
    Admitted(TradeIntent),
    /// Whole seconds left before another trade may be admitted (truncated).
    RejectedCooldown(u64),
    RejectedStopped(SessionOutcome),
}

impl AdmissionResult {
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissionResult::Admitted(_))
    }

    pub fn intent(&self) -> Option<&TradeIntent> {
        match self {
            AdmissionResult::Admitted(intent) => Some(intent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RiskGovernor {
    instrument: String,
    trade: TradeConfig,
    limits: RiskLimits,
    stats: SessionStats,
    outcome: SessionOutcome,
    /// Admitted trades still waiting for a result, oldest first.
    open_trades: VecDeque<TradeIntent>,
}

impl RiskGovernor {
    pub fn new(instrument: impl Into<String>, trade: TradeConfig, limits: RiskLimits) -> Self {
        Self {
            instrument: instrument.into(),
            trade,
            limits,
            stats: SessionStats::default(),
            outcome: SessionOutcome::Running,
            open_trades: VecDeque::new(),
        }
    }

    /// Decide whether `direction` becomes an order at time `now`.
    pub fn admit(&mut self, direction: Direction, now: DateTime<Utc>) -> AdmissionResult {
        if self.outcome.is_stopped() {
            return AdmissionResult::RejectedStopped(self.outcome);
        }

        if let Some(stop) = self.triggered_stop() {
            self.outcome = stop;
            warn!(
                outcome = %stop,
                pnl = self.stats.realized_pnl,
                trade_count = self.stats.trade_count,
                "session halted"
            );
            return AdmissionResult::RejectedStopped(stop);
        }

        if let Some(remaining) = self.cooldown_remaining(now) {
            info!(
                %direction,
                remaining_secs = remaining,
                "cooldown active, trade skipped"
            );
            return AdmissionResult::RejectedCooldown(remaining);
        }

        let intent = TradeIntent {
            instrument: self.instrument.clone(),
            direction,
            stake: self.trade.stake,
            currency: self.trade.currency.clone(),
            duration: self.trade.duration(),
        };
        self.stats.trade_count += 1;
        self.stats.last_trade_at = Some(now);
        self.open_trades.push_back(intent.clone());

        info!(
            contract = intent.contract_type(),
            stake = intent.stake,
            duration = %intent.duration,
            trade_count = self.stats.trade_count,
            "trade admitted"
        );
        AdmissionResult::Admitted(intent)
    }

    fn triggered_stop(&self) -> Option<SessionOutcome> {
        if self.stats.trade_count >= self.limits.max_trades {
            Some(SessionOutcome::StoppedMaxTrades)
        } else if self.stats.realized_pnl <= self.limits.stop_loss {
            Some(SessionOutcome::StoppedStopLoss)
        } else if self.stats.realized_pnl >= self.limits.take_profit {
            Some(SessionOutcome::StoppedTakeProfit)
        } else {
            None
        }
    }

    /// Seconds left in the cooldown, or `None` when a trade may go out.
    fn cooldown_remaining(&self, now: DateTime<Utc>) -> Option<u64> {
        let last = self.stats.last_trade_at?;
        let cooldown = self.limits.cooldown();
        let elapsed = now - last;
        if elapsed >= cooldown {
            return None;
        }
        // Out-of-order timestamps must not stretch the wait past one cooldown.
        let remaining = (cooldown - elapsed).min(cooldown);
        Some(remaining.num_seconds().max(0) as u64)
    }

    /// Apply a realized P/L and pair it with the oldest open trade.
    ///
    /// Never checks thresholds. A result with no open trade is still applied
    /// and comes back with `matched == false`. A non-finite `pnl` is dropped
    /// with no state change and yields `None`.
    pub fn record_result(&mut self, pnl: f64, closed_at: DateTime<Utc>) -> Option<ClosedTrade> {
        if !pnl.is_finite() {
            warn!(pnl, "non-finite trade result dropped");
            return None;
        }

        self.stats.realized_pnl += pnl;
        self.stats.balance += pnl;

        let opened = self.open_trades.pop_front();
        if opened.is_none() {
            warn!(pnl, "trade result with no open trade");
        }

        let closed = ClosedTrade {
            closed_at,
            direction: opened.as_ref().map(|t| t.direction),
            stake: opened.as_ref().map_or(0.0, |t| t.stake),
            pnl,
            balance: self.stats.balance,
            matched: opened.is_some(),
        };

        info!(
            pnl,
            session_pnl = self.stats.realized_pnl,
            balance = self.stats.balance,
            "trade result"
        );
        Some(closed)
    }

    /// Withdraw an admitted trade whose order never reached the venue.
    ///
    /// Only the newest open trade can be withdrawn, and only if it is
    /// `intent`. The trade still counts toward `max_trades` and the cooldown.
    pub fn abandon(&mut self, intent: &TradeIntent) -> bool {
        if self.open_trades.back() != Some(intent) {
            return false;
        }
        self.open_trades.pop_back();
        warn!(
            contract = intent.contract_type(),
            open_trades = self.open_trades.len(),
            "admitted trade withdrawn"
        );
        true
    }

    /// Seed the running balance from the account figure reported on connect.
    pub fn set_balance(&mut self, balance: f64) {
        if !balance.is_finite() {
            warn!(balance, "non-finite balance ignored");
            return;
        }
        self.stats.balance = balance;
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn outcome(&self) -> SessionOutcome {
        self.outcome
    }

    pub fn open_trades(&self) -> usize {
        self.open_trades.len()
    }
}
