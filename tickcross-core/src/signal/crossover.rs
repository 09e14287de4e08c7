//! Moving average crossover edge detector.
//!
//! Emits Long when the short average sits above the long one and the last
//! emitted signal was not Long; Short symmetrically. Equal averages, missing
//! averages, or a relation that matches the last signal emit nothing.

use serde::{Deserialize, Serialize};

use crate::domain::Direction;

/// Last directional signal emitted in this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignalState {
    /// Nothing emitted since the session started.
    #[default]
    Neutral,
    Long,
    Short,
}

impl SignalState {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            SignalState::Neutral => None,
            SignalState::Long => Some(Direction::Long),
            SignalState::Short => Some(Direction::Short),
        }
    }
}

impl From<Direction> for SignalState {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Long => SignalState::Long,
            Direction::Short => SignalState::Short,
        }
    }
}

/// Detector output for one pair of averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalEvaluation {
    pub state: SignalState,
    pub changed: bool,
}

impl SignalEvaluation {
    /// The freshly emitted direction, if this evaluation fired.
    pub fn emitted(&self) -> Option<Direction> {
        if self.changed {
            self.state.direction()
        } else {
            None
        }
    }
}

/// Pure crossover rule: `(short, long, prior) -> (new, changed)`.
pub fn evaluate_crossover(
    short: Option<f64>,
    long: Option<f64>,
    prior: SignalState,
) -> SignalEvaluation {
    let unchanged = SignalEvaluation {
        state: prior,
        changed: false,
    };

    let (short, long) = match (short, long) {
        (Some(s), Some(l)) => (s, l),
        _ => return unchanged,
    };

    if short > long && prior != SignalState::Long {
        return SignalEvaluation {
            state: SignalState::Long,
            changed: true,
        };
    }
    if short < long && prior != SignalState::Short {
        return SignalEvaluation {
            state: SignalState::Short,
            changed: true,
        };
    }

    // Equal averages, NaN comparisons, or same side as last signal.
    unchanged
}

/// Stateful wrapper that remembers the last emitted signal.
#[derive(Debug, Clone, Default)]
pub struct SignalDetector {
    state: SignalState,
}

impl SignalDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate the latest averages and commit any emitted signal.
    ///
    /// A fired signal is consumed here regardless of what the governor later
    /// decides; the same direction cannot fire again until the opposite one
    /// has.
    pub fn evaluate(&mut self, short: Option<f64>, long: Option<f64>) -> SignalEvaluation {
        let evaluation = evaluate_crossover(short, long, self.state);
        self.state = evaluation.state;
        evaluation
    }

    pub fn state(&self) -> SignalState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = SignalState::Neutral;
    }
}
