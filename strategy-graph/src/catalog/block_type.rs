//! Closed set of block kinds the engine knows how to compile

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    MarketData,
    PriceHistory,
    Constant,
    Sma,
    Ema,
    Rsi,
    Macd,
    BollingerBands,
    Compare,
    Crossover,
    And,
    Or,
    Not,
    Math,
    BuyOrder,
    SellOrder,
    ClosePosition,
    Log,
    Alert,
}

impl BlockType {
    pub const ALL: [BlockType; 19] = [
        BlockType::MarketData,
        BlockType::PriceHistory,
        BlockType::Constant,
        BlockType::Sma,
        BlockType::Ema,
        BlockType::Rsi,
        BlockType::Macd,
        BlockType::BollingerBands,
        BlockType::Compare,
        BlockType::Crossover,
        BlockType::And,
        BlockType::Or,
        BlockType::Not,
        BlockType::Math,
        BlockType::BuyOrder,
        BlockType::SellOrder,
        BlockType::ClosePosition,
        BlockType::Log,
        BlockType::Alert,
    ];

    /// Tag stored in `StrategyBlock::block_type`
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::MarketData => "market_data",
            BlockType::PriceHistory => "price_history",
            BlockType::Constant => "constant",
            BlockType::Sma => "sma",
            BlockType::Ema => "ema",
            BlockType::Rsi => "rsi",
            BlockType::Macd => "macd",
            BlockType::BollingerBands => "bollinger_bands",
            BlockType::Compare => "compare",
            BlockType::Crossover => "crossover",
            BlockType::And => "and",
            BlockType::Or => "or",
            BlockType::Not => "not",
            BlockType::Math => "math",
            BlockType::BuyOrder => "buy_order",
            BlockType::SellOrder => "sell_order",
            BlockType::ClosePosition => "close_position",
            BlockType::Log => "log",
            BlockType::Alert => "alert",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown block type '{0}'")]
pub struct UnknownBlockType(pub String);

impl FromStr for BlockType {
    type Err = UnknownBlockType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownBlockType(s.to_string()))
    }
}
