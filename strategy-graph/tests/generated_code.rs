//! Generated strategies build and run against the runtime module

use std::path::PathBuf;

use chrono::Utc;
use strategy_graph::prelude::*;

/// Every catalog block type, wired into one strategy that validates cleanly
fn every_block_type() -> StrategyDefinition {
    let catalog = BlockCatalog::builtin();
    let mut definition = StrategyDefinition::new("all-blocks", "Every Block", "tester", Utc::now());

    let blocks = [
        (BlockType::MarketData, "market"),
        (BlockType::PriceHistory, "history"),
        (BlockType::Constant, "floor"),
        (BlockType::Ema, "fast"),
        (BlockType::Sma, "slow"),
        (BlockType::Rsi, "rsi"),
        (BlockType::Macd, "macd"),
        (BlockType::BollingerBands, "bands"),
        (BlockType::Crossover, "cross"),
        (BlockType::Compare, "oversold"),
        (BlockType::Math, "spread"),
        (BlockType::Compare, "stretched"),
        (BlockType::And, "both"),
        (BlockType::Or, "either"),
        (BlockType::Not, "calm"),
        (BlockType::BuyOrder, "buy"),
        (BlockType::SellOrder, "sell"),
        (BlockType::ClosePosition, "close"),
        (BlockType::Log, "log"),
        (BlockType::Alert, "alert"),
    ];
    for (block_type, id) in blocks {
        let op = GraphOp::AddBlock {
            block_id: id.to_string(),
            block_type,
            position: Position::default(),
        };
        definition = apply(&definition, op, &catalog).unwrap();
    }

    let properties = [
        ("fast", "period", PropertyValue::Number(5.0)),
        ("slow", "period", PropertyValue::Number(12.0)),
        ("rsi", "period", PropertyValue::Number(6.0)),
        ("oversold", "operator", PropertyValue::from("<")),
        ("oversold", "threshold", PropertyValue::Number(40.0)),
        ("spread", "operation", PropertyValue::from("subtract")),
        ("history", "length", PropertyValue::Number(5.0)),
        ("alert", "message", PropertyValue::from("RSI oversold")),
    ];
    for (block_id, property, value) in properties {
        let op = GraphOp::UpdateProperty {
            block_id: block_id.to_string(),
            property: property.to_string(),
            value,
        };
        definition = apply(&definition, op, &catalog).unwrap();
    }

    let connections = [
        ("market", "price", "fast", "source"),
        ("market", "price", "slow", "source"),
        ("market", "price", "rsi", "source"),
        ("market", "price", "macd", "source"),
        ("market", "price", "bands", "source"),
        ("fast", "value", "cross", "fast"),
        ("slow", "value", "cross", "slow"),
        ("rsi", "value", "oversold", "a"),
        ("macd", "histogram", "spread", "a"),
        ("floor", "value", "spread", "b"),
        ("spread", "result", "stretched", "a"),
        ("bands", "lower", "stretched", "b"),
        ("cross", "signal", "both", "a"),
        ("oversold", "result", "both", "b"),
        ("both", "result", "either", "a"),
        ("stretched", "result", "either", "b"),
        ("either", "result", "calm", "value"),
        ("either", "result", "buy", "condition"),
        ("market", "price", "buy", "price"),
        ("calm", "result", "sell", "condition"),
        ("both", "result", "close", "condition"),
        ("history", "closes", "log", "value"),
        ("oversold", "result", "alert", "trigger"),
    ];
    for (i, (from, output, to, input)) in connections.into_iter().enumerate() {
        let op = GraphOp::AddConnection {
            connection_id: format!("c{}", i + 1),
            source_block_id: from.to_string(),
            source_output_id: format!("{}:out:{}", from, output),
            target_block_id: to.to_string(),
            target_input_id: format!("{}:in:{}", to, input),
        };
        definition = apply(&definition, op, &catalog).unwrap();
    }
    definition
}

/// Feeds a swinging price series, then exercises the parameter surface and
/// checks a reset replays identically
const DRIVER: &str = r#"
fn main() {
    use chrono::TimeZone;

    let start = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let ticks: Vec<Tick> = (0..200)
        .map(|i| {
            let price = 100.0 + 10.0 * (i as f64 / 7.0).sin();
            Tick::at_price("BTC/USDT", start + chrono::Duration::minutes(i), price)
        })
        .collect();

    let mut strategy = GeneratedStrategy::new();
    let first: Vec<Signal> = ticks.iter().flat_map(|t| strategy.execute(t)).collect();
    assert!(first.iter().any(|s| s.signal_type == SignalType::Alert));
    assert!(first.iter().any(|s| s.is_order()));

    for key in GeneratedStrategy::parameter_keys() {
        let value = strategy.get_parameter(key).unwrap();
        strategy.set_parameter(key, value.clone()).unwrap();
        assert_eq!(strategy.get_parameter(key), Some(value));
    }
    assert!(strategy.set_parameter("no_such_key", ParamValue::Number(1.0)).is_err());
    assert!(strategy.set_parameter("RSI_period", ParamValue::Boolean(true)).is_err());

    strategy.reset();
    let replay: Vec<Signal> = ticks.iter().flat_map(|t| strategy.execute(t)).collect();
    assert_eq!(first, replay);
}
"#;

#[test]
fn test_every_block_type_compiles_and_runs() {
    let definition = every_block_type();
    assert!(StrategyValidator::validate(&definition).is_empty());

    let compiled = generate(&definition).unwrap();
    assert_eq!(compiled.execution_order.len(), BlockType::ALL.len() + 1);
    assert!(compiled.parameter_keys.iter().any(|k| k == "RSI_period"));

    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("generated");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("every_block_type.rs");
    let source = format!("#![allow(dead_code)]\n\n{}{}", compiled.code, DRIVER);
    std::fs::write(&path, source).unwrap();

    let cases = trybuild::TestCases::new();
    cases.pass(&path);
}
