//! Simple Moving Average tracker over a bounded tick window.
//!
//! The window holds the most recent `max(short, long)` prices, oldest evicted
//! first. Each average is the unweighted mean of its own trailing `period`
//! prices and is absent until that many prices have been observed.

use std::collections::VecDeque;

/// Short and long averages for the current window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmaPair {
    pub short: Option<f64>,
    pub long: Option<f64>,
}

impl SmaPair {
    /// Both averages available.
    pub fn is_complete(&self) -> bool {
        self.short.is_some() && self.long.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SmaTracker {
    short_period: usize,
    long_period: usize,
    window: VecDeque<f64>,
}

impl SmaTracker {
    pub fn new(short_period: usize, long_period: usize) -> Self {
        assert!(short_period >= 1, "short SMA period must be >= 1");
        assert!(long_period >= 1, "long SMA period must be >= 1");
        let capacity = short_period.max(long_period);
        Self {
            short_period,
            long_period,
            window: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a price, evicting the oldest when the window is full.
    pub fn observe(&mut self, price: f64) {
        if self.window.len() == self.capacity() {
            self.window.pop_front();
        }
        self.window.push_back(price);
    }

    pub fn short_average(&self) -> Option<f64> {
        self.average(self.short_period)
    }

    pub fn long_average(&self) -> Option<f64> {
        self.average(self.long_period)
    }

    pub fn averages(&self) -> SmaPair {
        SmaPair {
            short: self.short_average(),
            long: self.long_average(),
        }
    }

    /// Mean of the trailing `period` prices, or `None` when fewer were observed.
    fn average(&self, period: usize) -> Option<f64> {
        let n = self.window.len();
        if n < period {
            return None;
        }
        let sum: f64 = self.window.iter().skip(n - period).sum();
        Some(sum / period as f64)
    }

    pub fn capacity(&self) -> usize {
        self.short_period.max(self.long_period)
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Prices currently retained, oldest first.
    pub fn window(&self) -> impl Iterator<Item = f64> + '_ {
        self.window.iter().copied()
    }

    pub fn short_period(&self) -> usize {
        self.short_period
    }

    pub fn long_period(&self) -> usize {
        self.long_period
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}
