//! Built-in block templates

use shared::{BlockCategory, DataKind, Size};

use super::{BlockTemplate, BlockType, InputSpec, OutputSpec, PropertySpec};

const COMPARE_OPERATORS: &[(&str, &str)] = &[
    (">", "Greater than"),
    ("<", "Less than"),
    (">=", "Greater or equal"),
    ("<=", "Less or equal"),
    ("==", "Equal"),
    ("!=", "Not equal"),
];

const ORDER_TYPES: &[(&str, &str)] = &[("market", "Market"), ("limit", "Limit")];

fn input(name: &str, data_kind: DataKind, required: bool) -> InputSpec {
    InputSpec {
        name: name.to_string(),
        data_kind,
        required,
    }
}

fn output(name: &str, data_kind: DataKind) -> OutputSpec {
    OutputSpec {
        name: name.to_string(),
        data_kind,
    }
}

fn template(
    block_type: BlockType,
    category: BlockCategory,
    name: &str,
    description: &str,
) -> BlockTemplate {
    let default_size = match category {
        BlockCategory::Data => Size::new(200.0, 120.0),
        BlockCategory::Indicator => Size::new(200.0, 100.0),
        BlockCategory::Logic | BlockCategory::Math => Size::new(160.0, 80.0),
        BlockCategory::Action | BlockCategory::Output => Size::new(180.0, 100.0),
    };
    BlockTemplate {
        block_type,
        category,
        name: name.to_string(),
        description: description.to_string(),
        inputs: Vec::new(),
        outputs: Vec::new(),
        properties: Vec::new(),
        default_size,
    }
}

impl BlockTemplate {
    fn with_inputs(mut self, inputs: Vec<InputSpec>) -> Self {
        self.inputs = inputs;
        self
    }

    fn with_outputs(mut self, outputs: Vec<OutputSpec>) -> Self {
        self.outputs = outputs;
        self
    }

    fn with_properties(mut self, properties: Vec<PropertySpec>) -> Self {
        self.properties = properties;
        self
    }
}

fn moving_average(block_type: BlockType, name: &str, description: &str) -> BlockTemplate {
    template(block_type, BlockCategory::Indicator, name, description)
        .with_inputs(vec![input("Source", DataKind::Number, false)])
        .with_outputs(vec![output("Value", DataKind::Indicator)])
        .with_properties(vec![PropertySpec::number("period", "Period", 20.0)
            .range(1.0, 500.0)
            .required()])
}

fn order_action(block_type: BlockType, name: &str, description: &str) -> BlockTemplate {
    template(block_type, BlockCategory::Action, name, description)
        .with_inputs(vec![
            input("Condition", DataKind::Boolean, true),
            input("Price", DataKind::Number, false),
        ])
        .with_outputs(vec![output("Order", DataKind::Order)])
        .with_properties(vec![
            PropertySpec::number("amount", "Amount", 1.0).min(0.0).required(),
            PropertySpec::select("order_type", "Order Type", "market", ORDER_TYPES),
            PropertySpec::number("cooldown", "Cooldown (s)", 0.0).range(0.0, 86_400.0),
        ])
}

fn binary_logic(block_type: BlockType, name: &str, description: &str) -> BlockTemplate {
    template(block_type, BlockCategory::Logic, name, description)
        .with_inputs(vec![
            input("A", DataKind::Boolean, true),
            input("B", DataKind::Boolean, true),
        ])
        .with_outputs(vec![output("Result", DataKind::Boolean)])
}

pub(super) fn templates() -> Vec<BlockTemplate> {
    vec![
        template(
            BlockType::MarketData,
            BlockCategory::Data,
            "Market Data",
            "Latest price, volume and candle for a symbol",
        )
        .with_outputs(vec![
            output("Price", DataKind::Number),
            output("Volume", DataKind::Number),
            output("Candle", DataKind::Candle),
        ])
        .with_properties(vec![
            PropertySpec::text("symbol", "Symbol", "BTC/USDT").required(),
            PropertySpec::select(
                "timeframe",
                "Timeframe",
                "5m",
                &[
                    ("1m", "1 minute"),
                    ("5m", "5 minutes"),
                    ("15m", "15 minutes"),
                    ("1h", "1 hour"),
                    ("4h", "4 hours"),
                    ("1d", "1 day"),
                ],
            ),
        ]),
        template(
            BlockType::PriceHistory,
            BlockCategory::Data,
            "Price History",
            "Rolling window of recent closing prices",
        )
        .with_outputs(vec![output("Closes", DataKind::Array)])
        .with_properties(vec![PropertySpec::number("length", "Length", 20.0)
            .range(1.0, 500.0)
            .required()]),
        template(
            BlockType::Constant,
            BlockCategory::Data,
            "Constant",
            "Fixed numeric value",
        )
        .with_outputs(vec![output("Value", DataKind::Number)])
        .with_properties(vec![PropertySpec::number("value", "Value", 0.0).required()]),
        moving_average(BlockType::Sma, "SMA", "Simple moving average"),
        moving_average(BlockType::Ema, "EMA", "Exponential moving average"),
        template(
            BlockType::Rsi,
            BlockCategory::Indicator,
            "RSI",
            "Relative strength index (0-100)",
        )
        .with_inputs(vec![input("Source", DataKind::Number, false)])
        .with_outputs(vec![output("Value", DataKind::Indicator)])
        .with_properties(vec![PropertySpec::number("period", "Period", 14.0)
            .range(2.0, 100.0)
            .required()]),
        template(
            BlockType::Macd,
            BlockCategory::Indicator,
            "MACD",
            "Moving average convergence divergence",
        )
        .with_inputs(vec![input("Source", DataKind::Number, false)])
        .with_outputs(vec![
            output("MACD", DataKind::Indicator),
            output("Signal", DataKind::Indicator),
            output("Histogram", DataKind::Indicator),
        ])
        .with_properties(vec![
            PropertySpec::number("fast", "Fast Period", 12.0).range(1.0, 100.0).required(),
            PropertySpec::number("slow", "Slow Period", 26.0).range(1.0, 200.0).required(),
            PropertySpec::number("signal", "Signal Period", 9.0).range(1.0, 100.0).required(),
        ]),
        template(
            BlockType::BollingerBands,
            BlockCategory::Indicator,
            "Bollinger Bands",
            "Moving average with standard deviation bands",
        )
        .with_inputs(vec![input("Source", DataKind::Number, false)])
        .with_outputs(vec![
            output("Upper", DataKind::Indicator),
            output("Middle", DataKind::Indicator),
            output("Lower", DataKind::Indicator),
        ])
        .with_properties(vec![
            PropertySpec::number("period", "Period", 20.0).range(2.0, 200.0).required(),
            PropertySpec::number("std_dev", "Std Dev", 2.0).range(0.1, 5.0).required(),
        ]),
        template(
            BlockType::Compare,
            BlockCategory::Logic,
            "Compare",
            "Compare A against B, or against the threshold when B is unconnected",
        )
        .with_inputs(vec![
            input("A", DataKind::Number, true),
            input("B", DataKind::Number, false),
        ])
        .with_outputs(vec![output("Result", DataKind::Boolean)])
        .with_properties(vec![
            PropertySpec::select("operator", "Operator", ">", COMPARE_OPERATORS),
            PropertySpec::number("threshold", "Threshold", 0.0),
        ]),
        template(
            BlockType::Crossover,
            BlockCategory::Logic,
            "Crossover",
            "Fires on the tick where Fast crosses Slow",
        )
        .with_inputs(vec![
            input("Fast", DataKind::Number, true),
            input("Slow", DataKind::Number, true),
        ])
        .with_outputs(vec![output("Signal", DataKind::Signal)])
        .with_properties(vec![PropertySpec::select(
            "direction",
            "Direction",
            "above",
            &[("above", "Crosses above"), ("below", "Crosses below")],
        )]),
        binary_logic(BlockType::And, "AND", "True when both inputs are true"),
        binary_logic(BlockType::Or, "OR", "True when either input is true"),
        template(BlockType::Not, BlockCategory::Logic, "NOT", "Negates its input")
            .with_inputs(vec![input("Value", DataKind::Boolean, true)])
            .with_outputs(vec![output("Result", DataKind::Boolean)]),
        template(
            BlockType::Math,
            BlockCategory::Math,
            "Math",
            "Arithmetic on A and B, or on A and the operand when B is unconnected",
        )
        .with_inputs(vec![
            input("A", DataKind::Number, true),
            input("B", DataKind::Number, false),
        ])
        .with_outputs(vec![output("Result", DataKind::Number)])
        .with_properties(vec![
            PropertySpec::select(
                "operation",
                "Operation",
                "add",
                &[
                    ("add", "Add"),
                    ("subtract", "Subtract"),
                    ("multiply", "Multiply"),
                    ("divide", "Divide"),
                    ("min", "Minimum"),
                    ("max", "Maximum"),
                ],
            ),
            PropertySpec::number("operand", "Operand", 0.0),
        ]),
        order_action(
            BlockType::BuyOrder,
            "Buy Order",
            "Places a buy order when the condition is true",
        ),
        order_action(
            BlockType::SellOrder,
            "Sell Order",
            "Places a sell order when the condition is true",
        ),
        template(
            BlockType::ClosePosition,
            BlockCategory::Action,
            "Close Position",
            "Closes the open position when the condition is true",
        )
        .with_inputs(vec![input("Condition", DataKind::Boolean, true)])
        .with_outputs(vec![output("Order", DataKind::Order)])
        .with_properties(vec![
            PropertySpec::number("cooldown", "Cooldown (s)", 0.0).range(0.0, 86_400.0),
        ]),
        template(
            BlockType::Log,
            BlockCategory::Output,
            "Log",
            "Writes the incoming value to the strategy log",
        )
        .with_inputs(vec![input("Value", DataKind::Any, true)])
        .with_properties(vec![
            PropertySpec::text("message", "Message", "value"),
            PropertySpec::select(
                "level",
                "Level",
                "info",
                &[("debug", "Debug"), ("info", "Info"), ("warn", "Warning")],
            ),
        ]),
        template(
            BlockType::Alert,
            BlockCategory::Output,
            "Alert",
            "Emits an alert signal each time the trigger turns true",
        )
        .with_inputs(vec![input("Trigger", DataKind::Boolean, true)])
        .with_properties(vec![
            PropertySpec::text("message", "Message", "Strategy alert").required(),
        ]),
    ]
}
