//! Trade direction and its venue contract label.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a trade intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Bet on the price rising.
    Long,
    /// Bet on the price falling.
    Short,
}

impl Direction {
    /// Contract type the venue expects for this side.
    pub fn contract_type(&self) -> &'static str {
        match self {
            Direction::Long => "RISE",
            Direction::Short => "FALL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "Long"),
            Direction::Short => write!(f, "Short"),
        }
    }
}
