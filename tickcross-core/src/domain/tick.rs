//! PriceTick: one quote from the streaming price feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single quote for one instrument. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    pub instrument: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

impl PriceTick {
    pub fn new(instrument: impl Into<String>, price: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            instrument: instrument.into(),
            price,
            timestamp,
        }
    }

    /// NaN and infinite quotes never enter the price window.
    pub fn has_finite_price(&self) -> bool {
        self.price.is_finite()
    }
}
