//! TradeIntent: what the governor hands to the order sink on admission.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Direction;

/// Unit of a contract duration, serialized with the venue's one-letter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationUnit {
    #[serde(rename = "t")]
    Ticks,
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "m")]
    Minutes,
    #[serde(rename = "h")]
    Hours,
    #[serde(rename = "d")]
    Days,
}

impl DurationUnit {
    pub fn code(&self) -> &'static str {
        match self {
            DurationUnit::Ticks => "t",
            DurationUnit::Seconds => "s",
            DurationUnit::Minutes => "m",
            DurationUnit::Hours => "h",
            DurationUnit::Days => "d",
        }
    }
}

/// Contract lifetime: `amount` of `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeDuration {
    pub amount: u32,
    pub unit: DurationUnit,
}

impl TradeDuration {
    pub fn new(amount: u32, unit: DurationUnit) -> Self {
        Self { amount, unit }
    }

    pub fn minutes(amount: u32) -> Self {
        Self::new(amount, DurationUnit::Minutes)
    }
}

impl fmt::Display for TradeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.code())
    }
}

/// A single order intent: fixed stake, fixed duration, one direction.
///
/// Produced only by `RiskGovernor::admit`; the order sink owns submission
/// and confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub instrument: String,
    pub direction: Direction,
    pub stake: f64,
    pub currency: String,
    pub duration: TradeDuration,
}

impl TradeIntent {
    pub fn contract_type(&self) -> &'static str {
        self.direction.contract_type()
    }
}
