//! Bollinger Bands indicator

use ta::indicators::{BollingerBands as TaBollingerBands, BollingerBandsOutput};

use crate::runtime::indicators::Warmed;

/// Moving average with standard deviation bands; the middle band is the value
pub type BollingerBands = Warmed<TaBollingerBands, BollingerBandsOutput>;

impl BollingerBands {
    /// A zero period is treated as 1 and a non-positive multiplier falls back
    /// to 2 standard deviations.
    pub fn new(period: usize, std_dev: f64) -> Self {
        let period = period.max(1);
        let std_dev = if std_dev.is_finite() && std_dev > 0.0 { std_dev } else { 2.0 };
        let inner = TaBollingerBands::new(period, std_dev).unwrap_or_default();
        Warmed::wrap("BollingerBands", inner, period, period)
    }

    pub fn upper(&self) -> Option<f64> {
        self.output().map(|o| o.upper)
    }

    pub fn middle(&self) -> Option<f64> {
        self.output().map(|o| o.average)
    }

    pub fn lower(&self) -> Option<f64> {
        self.output().map(|o| o.lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::indicators::Indicator;

    #[test]
    fn test_bands_bracket_the_average() {
        let mut bands = BollingerBands::new(4, 2.0);
        for price in [10.0, 12.0, 11.0] {
            bands.update(price);
        }
        assert_eq!(bands.upper(), None);
        bands.update(13.0);

        let (upper, middle, lower) = (bands.upper().unwrap(), bands.middle().unwrap(), bands.lower().unwrap());
        assert!((middle - 11.5).abs() < 1e-9);
        assert!(upper > middle && middle > lower);
        assert_eq!(bands.value(), Some(middle));
    }

    #[test]
    fn test_bad_multiplier_falls_back() {
        let mut bands = BollingerBands::new(2, -1.0);
        bands.update(1.0);
        bands.update(3.0);
        assert!(bands.upper().unwrap() > bands.middle().unwrap());
    }
}
