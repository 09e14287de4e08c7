//! Tickcross Core: signal-and-risk decision engine for a single-instrument trading bot.
//!
//! This crate contains:
//! - Domain types (ticks, trade intents, closed trades)
//! - Bounded-window SMA tracker
//! - One-shot-per-crossover signal detector
//! - Risk governor (stop-loss, take-profit, max trades, cooldown)
//! - Session controller driving sessions from an abstract feed
//! - Feed, order-sink and trade-log boundaries, plus a CSV replay feed and CSV trade log
//! - Lock-free live stats and a periodic reporter thread
//! - TOML configuration

pub mod config;
pub mod domain;
pub mod feed;
pub mod indicators;
pub mod report;
pub mod risk;
pub mod session;
pub mod signal;
pub mod sink;
pub mod trade_log;

pub use config::{BotConfig, ConfigError, SessionConfig};
pub use domain::{ClosedTrade, Direction, PriceTick, TradeIntent};
pub use feed::{FeedError, FeedEvent, FeedSource};
pub use risk::{AdmissionResult, RiskGovernor, RiskLimits, SessionOutcome, SessionStats};
pub use session::{RunSummary, Session, SessionController};
pub use signal::{SignalDetector, SignalState};
