//! One emission rule per block type
//!
//! Rules only describe behaviour: naming, input resolution and bookkeeping
//! live in the emitter.

use crate::catalog::BlockType;
use crate::codegen::emitter::BlockEmitter;

pub(crate) fn emit(block_type: BlockType, e: &mut BlockEmitter<'_>) {
    match block_type {
        BlockType::MarketData => market_data(e),
        BlockType::PriceHistory => price_history(e),
        BlockType::Constant => constant(e),
        BlockType::Sma => single_value_indicator(e, "SMA"),
        BlockType::Ema => single_value_indicator(e, "EMA"),
        BlockType::Rsi => single_value_indicator(e, "RSI"),
        BlockType::Macd => macd(e),
        BlockType::BollingerBands => bollinger_bands(e),
        BlockType::Compare => compare(e),
        BlockType::Crossover => crossover(e),
        BlockType::And => binary_logic(e, "&&"),
        BlockType::Or => binary_logic(e, "||"),
        BlockType::Not => not(e),
        BlockType::Math => math(e),
        BlockType::BuyOrder => order(e, "buy"),
        BlockType::SellOrder => order(e, "sell"),
        BlockType::ClosePosition => close_position(e),
        BlockType::Log => log(e),
        BlockType::Alert => alert(e),
    }
}

fn market_data(e: &mut BlockEmitter<'_>) {
    let (price, volume, candle) = (e.output("Price"), e.output("Volume"), e.output("Candle"));
    e.line(format!("{} = tick.close;", price));
    e.line(format!("{} = tick.volume;", volume));
    e.line(format!("{} = tick.candle();", candle));
}

fn price_history(e: &mut BlockEmitter<'_>) {
    let window = e.state("Window", |p| format!("Window::new(period_of({}))", p("length")));
    let closes = e.output("Closes");
    e.line(format!("{}.push(tick.close);", window));
    e.line(format!("{} = {}.values();", closes, window));
}

fn constant(e: &mut BlockEmitter<'_>) {
    let (value, out) = (e.param("value"), e.output("Value"));
    e.line(format!("{} = {};", out, value));
}

fn single_value_indicator(e: &mut BlockEmitter<'_>, ty: &str) {
    let indicator = e.state(ty, |p| format!("{}::new(period_of({}))", ty, p("period")));
    let (source, out) = (e.input("Source"), e.output("Value"));
    e.line(format!("{}.update({});", indicator, source));
    e.line(format!("{} = {}.value_or_nan();", out, indicator));
}

fn macd(e: &mut BlockEmitter<'_>) {
    let macd = e.state("MACD", |p| {
        format!(
            "MACD::new(period_of({}), period_of({}), period_of({}))",
            p("fast"),
            p("slow"),
            p("signal")
        )
    });
    let source = e.input("Source");
    let (line, signal, histogram) = (e.output("MACD"), e.output("Signal"), e.output("Histogram"));
    e.line(format!("{}.update({});", macd, source));
    e.line(format!("{} = {}.macd().unwrap_or(f64::NAN);", line, macd));
    e.line(format!("{} = {}.signal().unwrap_or(f64::NAN);", signal, macd));
    e.line(format!("{} = {}.histogram().unwrap_or(f64::NAN);", histogram, macd));
}

fn bollinger_bands(e: &mut BlockEmitter<'_>) {
    let bands = e.state("BollingerBands", |p| {
        format!("BollingerBands::new(period_of({}), {})", p("period"), p("std_dev"))
    });
    let source = e.input("Source");
    let (upper, middle, lower) = (e.output("Upper"), e.output("Middle"), e.output("Lower"));
    e.line(format!("{}.update({});", bands, source));
    e.line(format!("{} = {}.upper().unwrap_or(f64::NAN);", upper, bands));
    e.line(format!("{} = {}.middle().unwrap_or(f64::NAN);", middle, bands));
    e.line(format!("{} = {}.lower().unwrap_or(f64::NAN);", lower, bands));
}

fn compare(e: &mut BlockEmitter<'_>) {
    let a = e.input("A");
    let b = e.input_or("B", e.param("threshold"));
    let (operator, out) = (e.param("operator"), e.output("Result"));
    e.line(format!("{} = compare({}, {}, {});", out, a, operator, b));
}

fn crossover(e: &mut BlockEmitter<'_>) {
    let detector = e.state("Crossover", |p| format!("Crossover::new({})", p("direction")));
    let (fast, slow, out) = (e.input("Fast"), e.input("Slow"), e.output("Signal"));
    e.line(format!("{} = {}.update({}, {});", out, detector, fast, slow));
}

fn binary_logic(e: &mut BlockEmitter<'_>, operator: &str) {
    let (a, b, out) = (e.input("A"), e.input("B"), e.output("Result"));
    e.line(format!("{} = {} {} {};", out, a, operator, b));
}

fn not(e: &mut BlockEmitter<'_>) {
    let (value, out) = (e.input("Value"), e.output("Result"));
    e.line(format!("{} = !{};", out, value));
}

fn math(e: &mut BlockEmitter<'_>) {
    let a = e.input("A");
    let b = e.input_or("B", e.param("operand"));
    let (operation, out) = (e.param("operation"), e.output("Result"));
    e.line(format!("{} = arithmetic({}, {}, {});", out, operation, a, b));
}

fn order(e: &mut BlockEmitter<'_>, side: &str) {
    let cooldown = e.state("Cooldown", |p| format!("Cooldown::new({})", p("cooldown")));
    let (condition, price) = (e.input("Condition"), e.input("Price"));
    let (amount, order_type) = (e.param("amount"), e.param("order_type"));
    let (out, id) = (e.output("Order"), e.id_literal());

    e.line(format!("{} = None;", out));
    e.open(format!("if {} && {}.ready(tick.timestamp) {{", condition, cooldown));
    e.line(format!(
        "let signal = Signal::{}({}, tick.timestamp, {}, {}).with_order_type({});",
        side, id, price, amount, order_type
    ));
    e.line(format!("{}.mark(tick.timestamp);", cooldown));
    e.line("signals.push(signal.clone());".to_string());
    e.line(format!("{} = Some(signal);", out));
    e.close();
}

fn close_position(e: &mut BlockEmitter<'_>) {
    let cooldown = e.state("Cooldown", |p| format!("Cooldown::new({})", p("cooldown")));
    let condition = e.input("Condition");
    let (out, id) = (e.output("Order"), e.id_literal());

    e.line(format!("{} = None;", out));
    e.open(format!("if {} && {}.ready(tick.timestamp) {{", condition, cooldown));
    e.line(format!(
        "let signal = Signal::close({}, tick.timestamp, tick.close);",
        id
    ));
    e.line(format!("{}.mark(tick.timestamp);", cooldown));
    e.line("signals.push(signal.clone());".to_string());
    e.line(format!("{} = Some(signal);", out));
    e.close();
}

fn log(e: &mut BlockEmitter<'_>) {
    let value = e.input("Value");
    let (level, message, id) = (e.param("level"), e.param("message"), e.id_literal());
    e.line(format!("log_value({}, {}, {}, &{});", id, level, message, value));
}

/// Fires once per rising edge of the trigger
fn alert(e: &mut BlockEmitter<'_>) {
    let armed = e.state("bool", |_| "false".to_string());
    let trigger = e.input("Trigger");
    let (message, id) = (e.param("message"), e.id_literal());
    e.line(format!("let triggered = {};", trigger));
    e.open(format!("if triggered && !{} {{", armed));
    e.line(format!(
        "signals.push(Signal::alert({}, tick.timestamp, {}));",
        id, message
    ));
    e.close();
    e.line(format!("{} = triggered;", armed));
}
