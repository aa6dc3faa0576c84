//! Readiness tracking shared by every indicator wrapper

use ta::indicators::{BollingerBandsOutput, MovingAverageConvergenceDivergenceOutput};
use ta::{Next, Reset};

use crate::runtime::indicators::Indicator;

/// The number an indicator reports through [`Indicator::value`]
pub trait Headline {
    fn headline(&self) -> f64;
}

impl Headline for f64 {
    fn headline(&self) -> f64 {
        *self
    }
}

impl Headline for MovingAverageConvergenceDivergenceOutput {
    fn headline(&self) -> f64 {
        self.macd
    }
}

impl Headline for BollingerBandsOutput {
    fn headline(&self) -> f64 {
        self.average
    }
}

/// A `ta` indicator that publishes nothing until `warmup` finite values
/// have been fed to it
#[derive(Debug, Clone)]
pub struct Warmed<T, O> {
    name: &'static str,
    inner: T,
    period: usize,
    warmup: usize,
    seen: usize,
    last: Option<O>,
}

impl<T, O> Warmed<T, O> {
    pub(crate) fn wrap(name: &'static str, inner: T, period: usize, warmup: usize) -> Self {
        Self {
            name,
            inner,
            period,
            warmup: warmup.max(1),
            seen: 0,
            last: None,
        }
    }

    /// Main window length
    pub fn period(&self) -> usize {
        self.period
    }

    pub(crate) fn output(&self) -> Option<&O> {
        self.last.as_ref()
    }
}

impl<T, O> Indicator for Warmed<T, O>
where
    T: Next<f64, Output = O> + Reset,
    O: Headline,
{
    fn name(&self) -> &str {
        self.name
    }

    fn update(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        let output = self.inner.next(value);
        self.seen += 1;
        if self.seen >= self.warmup {
            self.last = Some(output);
        }
    }

    fn value(&self) -> Option<f64> {
        self.last.as_ref().map(Headline::headline)
    }

    fn is_ready(&self) -> bool {
        self.seen >= self.warmup
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.seen = 0;
        self.last = None;
    }
}
