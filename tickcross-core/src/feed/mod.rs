//! Feed abstraction: the inbound event stream for one session.
//!
//! A `FeedSource` yields ticks, trade results, connect and disconnect
//! notices in arrival order. The transport behind it (sockets, framing,
//! authentication, reconnect backoff) is not part of this crate.
//!
//! Provided sources:
//! - `VecFeed`: pre-built events, for tests and scripted runs
//! - `std::sync::mpsc::Receiver<FeedEvent>`: events pushed by a transport thread
//! - `ReplayFeed`: events read from a CSV file

pub mod replay;

pub use replay::ReplayFeed;

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{PriceTick, TradeResult};

#[derive(Debug, Error)]
pub enum FeedError {
    /// One malformed event; the stream itself is still usable.
    #[error("malformed feed event at row {row}: {message}")]
    Parse { row: u64, message: String },

    /// The stream cannot produce further events.
    #[error("feed I/O error: {0}")]
    Io(String),
}

impl FeedError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FeedError::Parse { .. })
    }
}

/// One inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Transport (re)authorized; carries the account balance.
    Connected { balance: f64, at: DateTime<Utc> },

    Tick(PriceTick),

    /// Realized P/L for a closed contract.
    TradeResult(TradeResult),

    /// Transport dropped. The current session ends here.
    Disconnected { reason: String, at: DateTime<Utc> },
}

/// Source of feed events, pulled one at a time.
pub trait FeedSource {
    /// Next event, `Ok(None)` once the feed is exhausted.
    fn next_event(&mut self) -> Result<Option<FeedEvent>, FeedError>;
}

/// In-memory feed over a fixed event list.
#[derive(Debug, Clone, Default)]
pub struct VecFeed {
    events: VecDeque<FeedEvent>,
}

impl VecFeed {
    pub fn new(events: impl IntoIterator<Item = FeedEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl FeedSource for VecFeed {
    fn next_event(&mut self) -> Result<Option<FeedEvent>, FeedError> {
        Ok(self.events.pop_front())
    }
}

/// Blocks until the transport thread sends an event; ends when it hangs up.
impl FeedSource for Receiver<FeedEvent> {
    fn next_event(&mut self) -> Result<Option<FeedEvent>, FeedError> {
        Ok(self.recv().ok())
    }
}
