//! Market data delivered to a generated strategy on every tick

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV values of the latest bar; what a `candle` port carries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// One market update: the latest candle for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Symbol (e.g., "BTC/USDT")
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    /// Latest traded price
    pub close: f64,
    pub volume: f64,
}

impl Tick {
    pub fn new(symbol: &str, timestamp: DateTime<Utc>, candle: Candle) -> Self {
        Self {
            symbol: symbol.to_string(),
            timestamp,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
        }
    }

    /// Flat tick where every price equals `price`
    pub fn at_price(symbol: &str, timestamp: DateTime<Utc>, price: f64) -> Self {
        Self::new(symbol, timestamp, Candle::new(price, price, price, price, 0.0))
    }

    pub fn candle(&self) -> Candle {
        Candle::new(self.open, self.high, self.low, self.close, self.volume)
    }
}
