//! Side effects emitted by a generated strategy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signal type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalType {
    /// Buy/Long signal
    Buy,
    /// Sell/Short signal
    Sell,
    /// Close any open position
    Close,
    /// Notification only, no order
    Alert,
}

/// How an order should be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    /// Parse a `select` property value; anything but "limit" is a market order
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("limit") {
            OrderType::Limit
        } else {
            OrderType::Market
        }
    }
}

/// Trading signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Signal type
    pub signal_type: SignalType,
    /// Block that emitted the signal
    pub block_id: String,
    pub timestamp: DateTime<Utc>,
    /// Order price (if an order)
    pub price: Option<f64>,
    /// Order amount (if an order)
    pub amount: Option<f64>,
    pub order_type: Option<OrderType>,
    /// Reason for signal
    pub reason: String,
}

impl Signal {
    /// Create buy signal
    pub fn buy(block_id: &str, timestamp: DateTime<Utc>, price: f64, amount: f64) -> Self {
        Self::order(SignalType::Buy, block_id, timestamp, price, amount)
    }

    /// Create sell signal
    pub fn sell(block_id: &str, timestamp: DateTime<Utc>, price: f64, amount: f64) -> Self {
        Self::order(SignalType::Sell, block_id, timestamp, price, amount)
    }

    /// Create close-position signal
    pub fn close(block_id: &str, timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            signal_type: SignalType::Close,
            block_id: block_id.to_string(),
            timestamp,
            price: Some(price),
            amount: None,
            order_type: Some(OrderType::Market),
            reason: String::new(),
        }
    }

    /// Create alert signal
    pub fn alert(block_id: &str, timestamp: DateTime<Utc>, message: &str) -> Self {
        Self {
            signal_type: SignalType::Alert,
            block_id: block_id.to_string(),
            timestamp,
            price: None,
            amount: None,
            order_type: None,
            reason: message.to_string(),
        }
    }

    fn order(
        signal_type: SignalType,
        block_id: &str,
        timestamp: DateTime<Utc>,
        price: f64,
        amount: f64,
    ) -> Self {
        Self {
            signal_type,
            block_id: block_id.to_string(),
            timestamp,
            price: Some(price),
            amount: Some(amount),
            order_type: Some(OrderType::Market),
            reason: String::new(),
        }
    }

    /// Set order type from a `select` property value
    pub fn with_order_type(mut self, order_type: &str) -> Self {
        self.order_type = Some(OrderType::parse(order_type));
        self
    }

    /// Orders, as opposed to alerts
    pub fn is_order(&self) -> bool {
        self.signal_type != SignalType::Alert
    }
}
