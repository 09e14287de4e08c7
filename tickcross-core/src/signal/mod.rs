//! Signal generation: crossover edges from the SMA pair.
//!
//! The detector never sees session stats or limits. It only answers
//! "did the short average just move to the other side of the long one?"

pub mod crossover;

pub use crossover::{evaluate_crossover, SignalDetector, SignalEvaluation, SignalState};
