//! Per-session counters owned by the risk governor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Cumulative realized P/L since session start.
    pub realized_pnl: f64,
    /// Trades admitted since session start.
    pub trade_count: u32,
    /// Time of the last admitted trade.
    pub last_trade_at: Option<DateTime<Utc>>,
    /// Account balance: seeded on connect, moved by every result.
    pub balance: f64,
}
