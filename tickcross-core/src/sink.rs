//! Outbound boundaries: order submission and the closed-trade audit log.

use thiserror::Error;

use crate::domain::{ClosedTrade, TradeIntent};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("order rejected by venue: {0}")]
    Rejected(String),

    #[error("order sink unavailable: {0}")]
    Unavailable(String),
}

/// Accepts admitted trade intents.
///
/// Submission is fire-and-forget from the session's point of view: realized
/// P/L comes back later as a `FeedEvent::TradeResult`.
pub trait OrderSink {
    fn submit(&mut self, intent: &TradeIntent) -> Result<(), SinkError>;
}

/// Receives one record per closed trade.
pub trait TradeLogSink {
    fn record(&mut self, trade: &ClosedTrade) -> Result<(), crate::trade_log::TradeLogError>;
}

/// Collects intents in memory.
impl OrderSink for Vec<TradeIntent> {
    fn submit(&mut self, intent: &TradeIntent) -> Result<(), SinkError> {
        self.push(intent.clone());
        Ok(())
    }
}

/// Collects closed trades in memory.
impl TradeLogSink for Vec<ClosedTrade> {
    fn record(&mut self, trade: &ClosedTrade) -> Result<(), crate::trade_log::TradeLogError> {
        self.push(trade.clone());
        Ok(())
    }
}

/// Discards every record, for runs with the trade log disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTradeLog;

impl TradeLogSink for NullTradeLog {
    fn record(&mut self, _trade: &ClosedTrade) -> Result<(), crate::trade_log::TradeLogError> {
        Ok(())
    }
}

impl<T: TradeLogSink + ?Sized> TradeLogSink for Box<T> {
    fn record(&mut self, trade: &ClosedTrade) -> Result<(), crate::trade_log::TradeLogError> {
        (**self).record(trade)
    }
}
