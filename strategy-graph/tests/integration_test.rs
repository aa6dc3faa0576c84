//! Integration tests for strategy-graph

use chrono::Utc;
use proptest::prelude::*;
use shared::{BlockCategory, DataKind, InputPort, OutputPort, Position, Size};
use strategy_graph::codegen::Section;
use strategy_graph::prelude::*;

/// Helper building a strategy through editor operations
struct Canvas {
    definition: StrategyDefinition,
    catalog: BlockCatalog,
}

impl Canvas {
    fn new(name: &str) -> Self {
        Self {
            definition: StrategyDefinition::new("strategy-1", name, "tester", Utc::now()),
            catalog: BlockCatalog::builtin(),
        }
    }

    fn block(mut self, block_type: BlockType, id: &str) -> Self {
        let op = GraphOp::AddBlock {
            block_id: id.to_string(),
            block_type,
            position: Position::new(0.0, 0.0),
        };
        self.definition = apply(&self.definition, op, &self.catalog).unwrap();
        self
    }

    fn set(mut self, id: &str, property: &str, value: PropertyValue) -> Self {
        let op = GraphOp::UpdateProperty {
            block_id: id.to_string(),
            property: property.to_string(),
            value,
        };
        self.definition = apply(&self.definition, op, &self.catalog).unwrap();
        self
    }

    fn try_connect(&self, id: &str, from: &str, output: &str, to: &str, input: &str) -> Result<StrategyDefinition, EditError> {
        let op = GraphOp::AddConnection {
            connection_id: id.to_string(),
            source_block_id: from.to_string(),
            source_output_id: format!("{}:out:{}", from, output),
            target_block_id: to.to_string(),
            target_input_id: format!("{}:in:{}", to, input),
        };
        apply(&self.definition, op, &self.catalog)
    }

    fn connect(mut self, id: &str, from: &str, output: &str, to: &str, input: &str) -> Self {
        self.definition = self.try_connect(id, from, output, to, input).unwrap();
        self
    }

    fn build(self) -> StrategyDefinition {
        self.definition
    }
}

fn rsi_dip_buyer() -> StrategyDefinition {
    Canvas::new("RSI Dip Buyer")
        .block(BlockType::MarketData, "market")
        .block(BlockType::Rsi, "rsi")
        .block(BlockType::Compare, "oversold")
        .block(BlockType::BuyOrder, "buy")
        .set("oversold", "operator", "<".into())
        .set("oversold", "threshold", 30.0.into())
        .connect("c1", "market", "price", "rsi", "source")
        .connect("c2", "rsi", "value", "oversold", "a")
        .connect("c3", "oversold", "result", "buy", "condition")
        .build()
}

fn bare_block(id: &str, inputs: &[(&str, DataKind)], outputs: &[(&str, DataKind)]) -> StrategyBlock {
    StrategyBlock {
        id: id.to_string(),
        block_type: "custom".to_string(),
        category: BlockCategory::Math,
        name: id.to_uppercase(),
        description: String::new(),
        position: Position::default(),
        size: Size::default(),
        inputs: inputs
            .iter()
            .map(|(name, kind)| InputPort {
                id: format!("{}:in:{}", id, name),
                name: name.to_string(),
                data_kind: *kind,
                required: true,
            })
            .collect(),
        outputs: outputs
            .iter()
            .map(|(name, kind)| OutputPort {
                id: format!("{}:out:{}", id, name),
                name: name.to_string(),
                data_kind: *kind,
            })
            .collect(),
        properties: Vec::new(),
    }
}

fn codes(issues: &[ValidationError]) -> Vec<ErrorCode> {
    issues.iter().map(|i| i.code).collect()
}

fn line_of(code: &str, needle: &str) -> usize {
    code.lines()
        .position(|l| l.contains(needle))
        .map(|i| i + 1)
        .unwrap_or_else(|| panic!("no line contains {:?}", needle))
}

#[test]
fn test_number_output_feeds_required_number_input() {
    let mut definition = StrategyDefinition::new("s", "Pair", "tester", Utc::now());
    // Target first, so the order comes from the edge and not from insertion
    definition.blocks.push(bare_block("b", &[("in", DataKind::Number)], &[]));
    definition.blocks.push(bare_block("a", &[], &[("out", DataKind::Number)]));

    let op = GraphOp::AddConnection {
        connection_id: "a-b".to_string(),
        source_block_id: "a".to_string(),
        source_output_id: "a:out:out".to_string(),
        target_block_id: "b".to_string(),
        target_input_id: "b:in:in".to_string(),
    };
    let next = apply(&definition, op, &BlockCatalog::builtin()).unwrap();
    let connection = next.connection("a-b").unwrap();
    assert_eq!(connection.data_kind, DataKind::Number);
    assert!(ConnectionValidator::validate(connection, &next.blocks, &next.connections).is_empty());

    let ordered: Vec<&str> = order(&next.blocks, &next.connections)
        .unwrap()
        .iter()
        .map(|b| b.id.as_str())
        .collect();
    assert_eq!(ordered, vec!["a", "b"]);
}

const KINDS: [DataKind; 9] = [
    DataKind::Number,
    DataKind::Boolean,
    DataKind::String,
    DataKind::Candle,
    DataKind::Indicator,
    DataKind::Signal,
    DataKind::Order,
    DataKind::Array,
    DataKind::Any,
];

#[test]
fn test_type_mismatch_exactly_when_kinds_are_incompatible() {
    for source in KINDS {
        for target in KINDS {
            let blocks = vec![
                bare_block("a", &[], &[("out", source)]),
                bare_block("b", &[("in", target)], &[]),
            ];
            let connection = BlockConnection {
                id: "a-b".to_string(),
                source_block_id: "a".to_string(),
                source_output_id: "a:out:out".to_string(),
                target_block_id: "b".to_string(),
                target_input_id: "b:in:in".to_string(),
                data_kind: source,
            };
            let issues = ConnectionValidator::validate(&connection, &blocks, &[]);
            let mismatch = codes(&issues).contains(&ErrorCode::TypeMismatch);
            assert_eq!(
                mismatch,
                !is_compatible(source, target),
                "{} -> {}: {:?}",
                source,
                target,
                issues
            );
            // Nothing else can be wrong with this pair
            assert!(issues.len() <= 1);
        }
    }
}

#[test]
fn test_self_loop_yields_one_invalid_connection() {
    let canvas = Canvas::new("Loop").block(BlockType::Not, "not");
    let definition = canvas.definition.clone();
    let candidate = BlockConnection {
        id: "loop".to_string(),
        source_block_id: "not".to_string(),
        source_output_id: "not:out:result".to_string(),
        target_block_id: "not".to_string(),
        target_input_id: "not:in:value".to_string(),
        data_kind: DataKind::Boolean,
    };

    let issues = ConnectionValidator::validate(&candidate, &definition.blocks, &definition.connections);
    assert_eq!(codes(&issues), vec![ErrorCode::InvalidConnection]);
    assert_eq!(issues[0].severity, Severity::Error);
    assert_eq!(issues[0].connection_id.as_deref(), Some("loop"));

    match canvas.try_connect("loop", "not", "result", "not", "value") {
        Err(EditError::ConnectionRejected(errors)) => {
            assert_eq!(codes(&errors), vec![ErrorCode::InvalidConnection]);
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[test]
fn test_ring_is_a_circular_dependency() {
    let catalog = BlockCatalog::builtin();
    let mut definition = StrategyDefinition::new("s", "Ring", "tester", Utc::now());
    for id in ["x", "y", "z"] {
        definition
            .blocks
            .push(catalog.instantiate(BlockType::Math, id, Position::default()).unwrap());
    }
    for (from, to) in [("x", "y"), ("y", "z"), ("z", "x")] {
        definition.connections.push(BlockConnection {
            id: format!("{}{}", from, to),
            source_block_id: from.to_string(),
            source_output_id: format!("{}:out:result", from),
            target_block_id: to.to_string(),
            target_input_id: format!("{}:in:a", to),
            data_kind: DataKind::Number,
        });
    }

    let report = StrategyValidator::report(&definition);
    assert!(report.has_cycle());
    assert!(report.has_errors());

    let err = order(&definition.blocks, &definition.connections).unwrap_err();
    assert_eq!(err.blocks, vec!["x", "y", "z"]);
    assert!(has_cycle(&definition.blocks, &definition.connections));
    assert!(matches!(generate(&definition), Err(CodegenError::CircularDependency)));
}

#[test]
fn test_closing_a_ring_through_the_editor_is_refused() {
    let canvas = Canvas::new("Ring")
        .block(BlockType::Math, "x")
        .block(BlockType::Math, "y")
        .connect("xy", "x", "result", "y", "a");
    let err = canvas.try_connect("yx", "y", "result", "x", "a").unwrap_err();
    assert!(matches!(err, EditError::WouldCreateCycle { .. }));
}

#[test]
fn test_unconnected_condition_blocks_compilation() {
    let definition = Canvas::new("No Condition")
        .block(BlockType::MarketData, "market")
        .block(BlockType::BuyOrder, "buy")
        .connect("price", "market", "price", "buy", "price")
        .build();

    let issues = StrategyValidator::validate(&definition);
    let missing: Vec<&ValidationError> = issues
        .iter()
        .filter(|i| i.code == ErrorCode::MissingConnection)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].block_id.as_deref(), Some("buy"));
    assert!(missing[0].message.contains("Condition"));

    match generate(&definition) {
        Err(CodegenError::Invalid(errors)) => {
            assert!(errors.iter().all(|e| e.is_error()));
            assert!(codes(&errors).contains(&ErrorCode::MissingConnection));
        }
        other => panic!("expected refusal, got {:?}", other.map(|c| c.code)),
    }
}

#[test]
fn test_indicators_alone_have_no_output() {
    let definition = Canvas::new("Indicators Only")
        .block(BlockType::MarketData, "market")
        .block(BlockType::Sma, "sma")
        .block(BlockType::Rsi, "rsi")
        .connect("c1", "market", "price", "sma", "source")
        .connect("c2", "market", "price", "rsi", "source")
        .build();

    let report = StrategyValidator::report(&definition);
    assert!(report.has_code(ErrorCode::NoOutputBlocks));
    assert!(!report.is_deployable());
    assert!(matches!(generate(&definition), Err(CodegenError::Invalid(_))));
}

#[test]
fn test_validation_is_idempotent() {
    let definitions = [
        rsi_dip_buyer(),
        Canvas::new("").block(BlockType::Compare, "lonely").build(),
        StrategyDefinition::new("s", "Empty", "tester", Utc::now()),
    ];
    for definition in &definitions {
        assert_eq!(
            StrategyValidator::validate(definition),
            StrategyValidator::validate(definition)
        );
    }
}

#[test]
fn test_rsi_dip_buyer_compiles() {
    let definition = rsi_dip_buyer();
    assert!(StrategyValidator::validate(&definition).is_empty());

    let compiled = generate(&definition).unwrap();
    let code = &compiled.code;

    assert!(code.contains("use strategy_graph::runtime::prelude::*;"));
    assert!(code.contains("pub struct GeneratedStrategy {"));
    assert!(code.contains("s_rsi: RSI::new(period_of(14.0)),"));
    assert!(code.contains("self.s_rsi.update(self.o_market_data_price);"));
    assert!(code.contains(
        "self.o_compare_result = compare(self.o_rsi_value, &self.p_compare_operator, self.p_compare_threshold);"
    ));
    assert!(code.contains("p_compare_operator: \"<\".to_string(),"));
    assert!(code.contains("p_compare_threshold: 30.0,"));
    assert!(code.contains(
        "let signal = Signal::buy(\"buy\", tick.timestamp, tick.close, self.p_buy_order_amount)\
         .with_order_type(&self.p_buy_order_order_type);"
    ));
    // Changing the period rebuilds the indicator
    assert!(code.contains("self.s_rsi = RSI::new(period_of(self.p_rsi_period));"));
    assert!(code.contains("_ => return Err(ParamError::Unknown(key.to_string())),"));
    assert!(code.contains("impl Default for GeneratedStrategy {"));

    assert_eq!(compiled.execution_order, vec!["market", "rsi", "oversold", "buy"]);
    assert_eq!(
        compiled.parameter_keys,
        vec![
            "Market Data_symbol",
            "Market Data_timeframe",
            "RSI_period",
            "Compare_operator",
            "Compare_threshold",
            "Buy Order_amount",
            "Buy Order_order_type",
            "Buy Order_cooldown",
        ]
    );
    assert!(compiled.warnings.is_empty());
}

#[test]
fn test_source_map_covers_every_block_and_connection() {
    let definition = rsi_dip_buyer();
    let compiled = generate(&definition).unwrap();
    let map = &compiled.source_map;
    let lines: Vec<&str> = compiled.code.lines().collect();

    for block in &definition.blocks {
        let locations = map.block_locations(&block.id);
        assert!(!locations.is_empty(), "block {} is unmapped", block.id);
        assert!(locations.iter().any(|l| l.section == Section::Update));
        assert!(locations.iter().all(|l| l.line >= 1 && l.line <= lines.len()));
    }
    for connection in &definition.connections {
        assert!(
            !map.connection_locations(&connection.id).is_empty(),
            "connection {} is unmapped",
            connection.id
        );
    }

    let update = line_of(&compiled.code, "self.s_rsi.update(");
    assert_eq!(map.block_at(update), Some("rsi"));
    assert_eq!(map.connection_at(update), Some("c1"));

    // The column points at the expression carried by the connection
    let location = map.connection_locations("c2")[0];
    let text = lines[location.line - 1];
    assert!(text[location.column - 1..].starts_with("self.o_rsi_value"));
    assert_eq!(map.block_at(location.line), Some("oversold"));
}

#[test]
fn test_compilation_is_deterministic() {
    let definition = rsi_dip_buyer();
    let first = generate(&definition).unwrap();
    let second = generate(&definition).unwrap();
    assert_eq!(first.code, second.code);
    assert_eq!(first.source_map, second.source_map);
    assert_eq!(
        serde_json::to_string(&first.source_map).unwrap(),
        serde_json::to_string(&second.source_map).unwrap()
    );
}

#[test]
fn test_last_connection_into_an_input_wins() {
    let canvas = Canvas::new("Two Sources")
        .block(BlockType::Constant, "low")
        .block(BlockType::Constant, "high")
        .block(BlockType::Compare, "cmp")
        .block(BlockType::Alert, "alert")
        .set("low", "value", 1.0.into())
        .set("high", "value", 2.0.into())
        .connect("first", "low", "value", "cmp", "a")
        .connect("second", "high", "value", "cmp", "a")
        .connect("fire", "cmp", "result", "alert", "trigger");
    let definition = canvas.build();

    let compiled = generate(&definition).unwrap();
    assert_eq!(codes(&compiled.warnings), vec![ErrorCode::MultipleInputs]);
    assert!(compiled
        .code
        .contains("self.o_compare_result = compare(self.o_constant_2_value, "));
    assert_eq!(
        &compiled.parameter_keys[..2],
        &["Constant_value".to_string(), "Constant_value_2".to_string()]
    );

    let map = &compiled.source_map;
    let winner = map.connection_locations("second")[0];
    assert!(winner.column > 1);
    let superseded = map.connection_locations("first")[0];
    assert_eq!(superseded.column, 1);
    assert_eq!(map.block_at(superseded.line), Some("cmp"));
    assert_eq!(superseded.section, Section::Update);
}

#[test]
fn test_deny_warnings_refuses_orphans() {
    let definition = Canvas::new("Orphan")
        .block(BlockType::MarketData, "market")
        .block(BlockType::Rsi, "rsi")
        .block(BlockType::Compare, "cmp")
        .block(BlockType::Alert, "alert")
        .block(BlockType::Sma, "unused")
        .connect("c1", "market", "price", "rsi", "source")
        .connect("c2", "rsi", "value", "cmp", "a")
        .connect("c3", "cmp", "result", "alert", "trigger")
        .build();

    let lenient = generate(&definition).unwrap();
    assert_eq!(codes(&lenient.warnings), vec![ErrorCode::OrphanedBlock]);
    assert!(lenient.code.contains("self.s_sma.update(tick.close);"));

    let strict = CodeGenerator::new(CodegenOptions {
        deny_warnings: true,
        ..CodegenOptions::default()
    });
    match strict.generate(&definition) {
        Err(CodegenError::Invalid(findings)) => {
            assert_eq!(codes(&findings), vec![ErrorCode::OrphanedBlock]);
        }
        other => panic!("expected refusal, got {:?}", other.map(|c| c.code)),
    }
}

#[test]
fn test_custom_struct_name_and_runtime_path() {
    let generator = CodeGenerator::new(CodegenOptions {
        struct_name: "DipBuyer".to_string(),
        runtime_path: "crate::runtime".to_string(),
        indent: 2,
        deny_warnings: false,
    });
    let compiled = generator.generate(&rsi_dip_buyer()).unwrap();
    assert!(compiled.code.contains("use crate::runtime::prelude::*;"));
    assert!(compiled.code.contains("pub struct DipBuyer {"));
    assert!(compiled.code.contains("impl Default for DipBuyer {"));
    assert!(compiled.code.contains("\n  pub fn new() -> Self {"));
}

#[test]
fn test_unknown_block_type_is_unsupported() {
    let mut definition = rsi_dip_buyer();
    definition.blocks.push(bare_block("fib", &[], &[]));
    definition.blocks.last_mut().unwrap().block_type = "fibonacci".to_string();

    match generate(&definition) {
        Err(CodegenError::UnsupportedBlockType { block_id, block_type }) => {
            assert_eq!(block_id, "fib");
            assert_eq!(block_type, "fibonacci");
        }
        other => panic!("expected unsupported type, got {:?}", other.map(|c| c.code)),
    }
}

#[test]
fn test_missing_properties_take_template_defaults() {
    let mut definition = rsi_dip_buyer();
    let buy = definition.block_mut("buy").unwrap();
    buy.properties.retain(|p| p.name != "cooldown");

    let compiled = generate(&definition).unwrap();
    assert!(compiled.parameter_keys.contains(&"Buy Order_cooldown".to_string()));
    assert!(compiled.code.contains("s_buy_order: Cooldown::new(0.0),"));
}

#[test]
fn test_edit_session_round_trips_through_json() {
    let definition = rsi_dip_buyer();
    let catalog = BlockCatalog::builtin();

    let moved = apply(
        &definition,
        GraphOp::MoveBlock {
            block_id: "rsi".to_string(),
            position: Position::new(320.0, 80.0),
        },
        &catalog,
    )
    .unwrap();
    let saved = save(&moved, Utc::now());
    assert_eq!(saved.version, definition.version + 1);

    let restored = StrategyDefinition::from_json(&saved.to_json().unwrap()).unwrap();
    assert_eq!(restored, saved);
    assert_eq!(restored.block("rsi").unwrap().position, Position::new(320.0, 80.0));

    // Layout changes never change the generated code
    let body = |d: &StrategyDefinition| -> Vec<String> {
        generate(d).unwrap().code.lines().skip(1).map(str::to_string).collect()
    };
    assert_eq!(body(&restored), body(&definition));

    let pruned = apply(
        &restored,
        GraphOp::DeleteBlock {
            block_id: "oversold".to_string(),
        },
        &catalog,
    )
    .unwrap();
    assert_eq!(pruned.connections.len(), 1);
    assert!(StrategyValidator::report(&pruned).has_code(ErrorCode::MissingConnection));
}

fn layered(ranks: &[usize], edges: &[(usize, usize)]) -> (Vec<StrategyBlock>, Vec<BlockConnection>) {
    let blocks = ranks
        .iter()
        .map(|r| bare_block(&format!("n{}", r), &[("in", DataKind::Number)], &[("out", DataKind::Number)]))
        .collect();
    let connections = edges
        .iter()
        .filter(|(a, b)| a != b)
        .enumerate()
        .map(|(i, &(a, b))| {
            let (from, to) = (a.min(b), a.max(b));
            BlockConnection {
                id: format!("e{}", i),
                source_block_id: format!("n{}", from),
                source_output_id: format!("n{}:out:out", from),
                target_block_id: format!("n{}", to),
                target_input_id: format!("n{}:in:in", to),
                data_kind: DataKind::Number,
            }
        })
        .collect();
    (blocks, connections)
}

fn dag() -> impl Strategy<Value = (Vec<usize>, Vec<(usize, usize)>)> {
    (1usize..12).prop_flat_map(|n| {
        (
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
            prop::collection::vec((0..n, 0..n), 0..30),
        )
    })
}

proptest! {
    #[test]
    fn prop_order_is_a_permutation_respecting_edges((ranks, edges) in dag()) {
        let (blocks, connections) = layered(&ranks, &edges);
        let ordered = order(&blocks, &connections).unwrap();
        let position = |id: &str| ordered.iter().position(|b| b.id == id).unwrap();

        prop_assert_eq!(ordered.len(), blocks.len());
        for block in &blocks {
            prop_assert_eq!(ordered.iter().filter(|b| b.id == block.id).count(), 1);
        }
        for c in &connections {
            prop_assert!(position(&c.source_block_id) < position(&c.target_block_id));
        }
        prop_assert!(!has_cycle(&blocks, &connections));
    }

    #[test]
    fn prop_reversing_an_edge_would_close_a_cycle((ranks, edges) in dag()) {
        let (blocks, connections) = layered(&ranks, &edges);
        for c in &connections {
            prop_assert!(would_create_cycle(&blocks, &connections, &c.target_block_id, &c.source_block_id));
        }
    }

    #[test]
    fn prop_validation_is_idempotent((ranks, edges) in dag()) {
        let (blocks, connections) = layered(&ranks, &edges);
        let mut definition = StrategyDefinition::new("s", "Random", "tester", Utc::now());
        definition.blocks = blocks;
        definition.connections = connections;
        let first = StrategyValidator::validate(&definition);
        prop_assert_eq!(&first, &StrategyValidator::validate(&definition));
        prop_assert!(!first.iter().any(|i| i.code == ErrorCode::CircularDependency));
    }
}
