//! Risk management: session limits, stats, and trade admission.
//!
//! The governor is the only owner of `SessionStats`. Every signal the
//! detector emits passes through `RiskGovernor::admit` exactly once.

pub mod governor;
pub mod limits;
pub mod stats;

pub use governor::{AdmissionResult, RiskGovernor, SessionOutcome};
pub use limits::RiskLimits;
pub use stats::SessionStats;
