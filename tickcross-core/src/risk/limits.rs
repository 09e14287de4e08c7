//! Session risk limits.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Longest cooldown accepted by config validation (one week).
pub const MAX_COOLDOWN_SECS: u64 = 7 * 24 * 60 * 60;

/// Immutable per-process risk limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLimits {
    /// Halt once session P/L is at or below this (negative) amount.
    pub stop_loss: f64,
    /// Halt once session P/L is at or above this (positive) amount.
    pub take_profit: f64,
    /// Halt once this many trades have been admitted.
    pub max_trades: u32,
    /// Minimum seconds between two admitted trades.
    pub cooldown_secs: u64,
}

impl RiskLimits {
    pub fn cooldown(&self) -> Duration {
        Duration::seconds(self.cooldown_secs.min(MAX_COOLDOWN_SECS) as i64)
    }
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            stop_loss: -10.0,
            take_profit: 20.0,
            max_trades: 10,
            cooldown_secs: 60,
        }
    }
}
