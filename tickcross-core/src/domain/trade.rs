//! Trade results coming back from the venue and the closed-trade audit record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Direction;

/// Realized P/L for one closed contract, as reported by the venue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub pnl: f64,
    pub closed_at: DateTime<Utc>,
}

/// One row of the trade log: a result paired with the trade it closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub closed_at: DateTime<Utc>,
    /// `None` when the result arrived with no open trade to pair with.
    pub direction: Option<Direction>,
    pub stake: f64,
    pub pnl: f64,
    /// Running balance after applying `pnl`.
    pub balance: f64,
    pub matched: bool,
}

impl ClosedTrade {
    /// Label written to the trade log's "Trade Type" column.
    pub fn trade_type(&self) -> &'static str {
        match self.direction {
            Some(direction) => direction.contract_type(),
            None => "UNMATCHED",
        }
    }
}
