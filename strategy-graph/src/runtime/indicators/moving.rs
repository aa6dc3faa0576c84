//! Single-valued moving indicators

use ta::indicators::{ExponentialMovingAverage, RelativeStrengthIndex, SimpleMovingAverage};

use crate::runtime::indicators::Warmed;

/// Simple moving average
pub type SMA = Warmed<SimpleMovingAverage, f64>;

/// Exponential moving average
pub type EMA = Warmed<ExponentialMovingAverage, f64>;

/// Relative strength index (0-100)
pub type RSI = Warmed<RelativeStrengthIndex, f64>;

impl SMA {
    /// A zero period is treated as 1
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        let inner = SimpleMovingAverage::new(period).unwrap_or_default();
        Warmed::wrap("SMA", inner, period, period)
    }
}

impl EMA {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        let inner = ExponentialMovingAverage::new(period).unwrap_or_default();
        Warmed::wrap("EMA", inner, period, period)
    }
}

impl RSI {
    /// Needs `period + 1` prices before the first value
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        let inner = RelativeStrengthIndex::new(period).unwrap_or_default();
        Warmed::wrap("RSI", inner, period, period + 1)
    }
}
