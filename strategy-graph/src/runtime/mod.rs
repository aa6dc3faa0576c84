//! Runtime support for generated strategies
//!
//! Code emitted by [`crate::codegen`] imports `prelude::*` from this module and
//! nothing else, so everything a block's update statement touches lives here.

pub mod convert;
pub mod helpers;
pub mod indicators;
pub mod params;
pub mod signal;
pub mod tick;

pub use helpers::*;
pub use indicators::*;
pub use params::*;
pub use signal::*;
pub use tick::*;

pub mod prelude {
    pub use super::convert;
    pub use super::helpers::{arithmetic, compare, log_value, Cooldown, Crossover, Window};
    pub use super::indicators::{period_of, BollingerBands, Indicator, EMA, MACD, RSI, SMA};
    pub use super::params::{ParamError, ParamValue};
    pub use super::signal::{OrderType, Signal, SignalType};
    pub use super::tick::{Candle, Tick};
}
