//! Incremental indicator state for generated strategies
//!
//! Thin wrappers over the `ta` crate that track readiness, so a block only
//! publishes a value once its window is full.

pub mod bb;
pub mod macd;
pub mod moving;
mod warmed;

pub use bb::*;
pub use macd::*;
pub use moving::*;
pub use warmed::{Headline, Warmed};

/// Indicator trait for all indicators
pub trait Indicator {
    /// Get the name of the indicator
    fn name(&self) -> &str;

    /// Update indicator with new value
    fn update(&mut self, value: f64);

    /// Get current indicator value
    fn value(&self) -> Option<f64>;

    /// Check if indicator is ready (has enough data)
    fn is_ready(&self) -> bool;

    /// Drop accumulated history, keeping the configured periods
    fn reset(&mut self);

    /// Current value, or NaN while warming up
    fn value_or_nan(&self) -> f64 {
        self.value().unwrap_or(f64::NAN)
    }
}

/// Convert a numeric block parameter to a window length (at least 1)
pub fn period_of(value: f64) -> usize {
    if value.is_finite() && value >= 1.0 {
        value.round() as usize
    } else {
        1
    }
}
