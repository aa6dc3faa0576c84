//! MACD (Moving Average Convergence Divergence) indicator

use ta::indicators::{MovingAverageConvergenceDivergence, MovingAverageConvergenceDivergenceOutput};

use crate::runtime::indicators::Warmed;

/// MACD line, signal line and histogram; [`Indicator::value`] is the MACD line
///
/// [`Indicator::value`]: crate::runtime::indicators::Indicator::value
pub type MACD = Warmed<MovingAverageConvergenceDivergence, MovingAverageConvergenceDivergenceOutput>;

impl MACD {
    /// Zero periods are treated as 1
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        let (fast, slow, signal) = (fast_period.max(1), slow_period.max(1), signal_period.max(1));
        let inner = MovingAverageConvergenceDivergence::new(fast, slow, signal).unwrap_or_default();
        Warmed::wrap("MACD", inner, slow, slow + signal + 1)
    }

    pub fn macd(&self) -> Option<f64> {
        self.output().map(|o| o.macd)
    }

    pub fn signal(&self) -> Option<f64> {
        self.output().map(|o| o.signal)
    }

    /// MACD minus signal
    pub fn histogram(&self) -> Option<f64> {
        self.output().map(|o| o.histogram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::indicators::Indicator;

    #[test]
    fn test_macd_publishes_all_lines_together() {
        let mut macd = MACD::new(3, 6, 2);
        for i in 0..8 {
            macd.update(100.0 + i as f64);
        }
        assert!(!macd.is_ready());
        assert_eq!(macd.signal(), None);

        macd.update(108.0);
        assert!(macd.is_ready());
        let (line, signal, histogram) = (macd.macd().unwrap(), macd.signal().unwrap(), macd.histogram().unwrap());
        assert!((line - signal - histogram).abs() < 1e-9);
        assert_eq!(macd.value(), Some(line));
    }
}
