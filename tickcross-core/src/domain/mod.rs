//! Domain types for the tickcross engine

pub mod direction;
pub mod intent;
pub mod tick;
pub mod trade;

pub use direction::Direction;
pub use intent::{DurationUnit, TradeDuration, TradeIntent};
pub use tick::PriceTick;
pub use trade::{ClosedTrade, TradeResult};
