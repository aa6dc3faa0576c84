//! Per-block emission context
//!
//! A `BlockEmitter` hands an emission rule everything it may reference (the
//! block's parameter fields, resolved input expressions, output fields) and
//! collects what the rule produces (state fields and update lines).

use std::cell::RefCell;
use std::collections::HashMap;

use shared::{DataKind, PropertyKind, PropertyValue, StrategyBlock};

use crate::codegen::CodegenError;
use crate::compat;
use crate::naming;

/// Rust representation of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParamKind {
    Number,
    Text,
    Boolean,
}

impl ParamKind {
    pub fn of(kind: PropertyKind) -> Self {
        match kind {
            PropertyKind::Number => ParamKind::Number,
            PropertyKind::String | PropertyKind::Select => ParamKind::Text,
            PropertyKind::Boolean => ParamKind::Boolean,
        }
    }

    pub fn rust_type(&self) -> &'static str {
        match self {
            ParamKind::Number => "f64",
            ParamKind::Text => "String",
            ParamKind::Boolean => "bool",
        }
    }

    fn variant(&self) -> &'static str {
        match self {
            ParamKind::Number => "Number",
            ParamKind::Text => "Text",
            ParamKind::Boolean => "Boolean",
        }
    }

    fn accessor(&self) -> &'static str {
        match self {
            ParamKind::Number => "as_number",
            ParamKind::Text => "as_text",
            ParamKind::Boolean => "as_bool",
        }
    }
}

/// Block property surfaced as a runtime parameter
#[derive(Debug, Clone)]
pub(crate) struct ParamSlot {
    /// Public key, `{blockName}_{propertyName}`
    pub key: String,
    pub property: String,
    pub field: String,
    pub kind: ParamKind,
    pub value: Option<PropertyValue>,
}

impl ParamSlot {
    /// Literal of the configured value, borrowed form for text
    pub fn literal(&self) -> String {
        match self.kind {
            ParamKind::Number => {
                float_literal(self.value.as_ref().and_then(|v| v.as_number()).unwrap_or(0.0))
            }
            ParamKind::Text => {
                format!("{:?}", self.value.as_ref().and_then(|v| v.as_text()).unwrap_or(""))
            }
            ParamKind::Boolean => self
                .value
                .as_ref()
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
                .to_string(),
        }
    }

    /// Owned initializer for the struct field
    pub fn initializer(&self) -> String {
        match self.kind {
            ParamKind::Text => format!("{}.to_string()", self.literal()),
            _ => self.literal(),
        }
    }

    /// Read of the live field, borrowed form for text
    pub fn read(&self) -> String {
        match self.kind {
            ParamKind::Text => format!("&self.{}", self.field),
            _ => format!("self.{}", self.field),
        }
    }

    pub fn getter(&self) -> String {
        match self.kind {
            ParamKind::Text => format!("ParamValue::Text(self.{}.clone())", self.field),
            kind => format!("ParamValue::{}(self.{})", kind.variant(), self.field),
        }
    }

    pub fn setter(&self) -> String {
        format!("self.{} = value.{}(key)?", self.field, self.kind.accessor())
    }
}

/// Output port backed by a struct field
#[derive(Debug, Clone)]
pub(crate) struct OutputSlot {
    pub port_id: String,
    pub name: String,
    pub field: String,
    pub kind: DataKind,
}

impl OutputSlot {
    pub fn new(
        block_id: &str,
        port_id: &str,
        name: &str,
        field: String,
        kind: DataKind,
    ) -> Result<Self, CodegenError> {
        if rust_type(kind).is_none() {
            return Err(CodegenError::UnsupportedPortKind {
                block_id: block_id.to_string(),
                port_id: port_id.to_string(),
                kind,
            });
        }
        Ok(Self {
            port_id: port_id.to_string(),
            name: name.to_string(),
            field,
            kind,
        })
    }

    pub fn rust_type(&self) -> &'static str {
        rust_type(self.kind).unwrap_or("f64")
    }

    pub fn default_value(&self) -> &'static str {
        default_value(self.kind)
    }
}

/// Field type holding a value of `kind`; `Any` has none
pub(crate) fn rust_type(kind: DataKind) -> Option<&'static str> {
    match kind {
        DataKind::Number | DataKind::Indicator => Some("f64"),
        DataKind::Boolean | DataKind::Signal => Some("bool"),
        DataKind::String => Some("String"),
        DataKind::Candle => Some("Candle"),
        DataKind::Array => Some("Vec<f64>"),
        DataKind::Order => Some("Option<Signal>"),
        DataKind::Any => None,
    }
}

fn default_value(kind: DataKind) -> &'static str {
    match kind {
        DataKind::Number | DataKind::Indicator => "f64::NAN",
        DataKind::Boolean | DataKind::Signal => "false",
        DataKind::String | DataKind::Any => "String::new()",
        DataKind::Candle => "Candle::default()",
        DataKind::Array => "Vec::new()",
        DataKind::Order => "None",
    }
}

/// Expression used for an unconnected input of `kind`
pub(crate) fn fallback(kind: DataKind) -> &'static str {
    match kind {
        DataKind::Number | DataKind::Indicator => "tick.close",
        DataKind::Candle => "tick.candle()",
        other => default_value(other),
    }
}

/// Expression reading `field` (an output of kind `from`) as kind `to`
pub(crate) fn convert_expr(
    connection_id: &str,
    field: &str,
    from: DataKind,
    to: DataKind,
) -> Result<String, CodegenError> {
    let unsupported = || CodegenError::UnsupportedConversion {
        connection_id: connection_id.to_string(),
        from,
        to,
    };
    if !compat::is_compatible(from, to) {
        return Err(unsupported());
    }

    let expr = match (from, to) {
        (DataKind::Any, _) => return Err(unsupported()),
        (_, DataKind::Any) => format!("convert::debug_text(&self.{})", field),
        (DataKind::Number, DataKind::Number)
        | (DataKind::Indicator, DataKind::Indicator)
        | (DataKind::Indicator, DataKind::Number)
        | (DataKind::Boolean, DataKind::Boolean)
        | (DataKind::Signal, DataKind::Signal)
        | (DataKind::Signal, DataKind::Boolean) => format!("self.{}", field),
        (a, b) if a == b => format!("self.{}.clone()", field),
        (DataKind::Candle, DataKind::Number) => format!("convert::candle_to_number(&self.{})", field),
        (DataKind::Number, DataKind::String) => format!("convert::number_to_text(self.{})", field),
        (DataKind::Boolean, DataKind::String) => format!("convert::bool_to_text(self.{})", field),
        (DataKind::Array, DataKind::Number) => format!("convert::array_to_number(&self.{})", field),
        (DataKind::Array, DataKind::Boolean) => format!("convert::array_to_bool(&self.{})", field),
        (DataKind::Array, DataKind::String) => format!("convert::array_to_text(&self.{})", field),
        (DataKind::Number, DataKind::Array) => format!("convert::number_to_array(self.{})", field),
        (DataKind::Boolean, DataKind::Array) => format!("convert::bool_to_array(self.{})", field),
        (DataKind::String, DataKind::Array) => format!("convert::text_to_array(&self.{})", field),
        _ => return Err(unsupported()),
    };
    Ok(expr)
}

/// Rust float literal; non-finite values map to the `f64` constants
pub(crate) fn float_literal(value: f64) -> String {
    if value.is_nan() {
        "f64::NAN".to_string()
    } else if value == f64::INFINITY {
        "f64::INFINITY".to_string()
    } else if value == f64::NEG_INFINITY {
        "f64::NEG_INFINITY".to_string()
    } else {
        format!("{:?}", value)
    }
}

/// Resolved value feeding one input port
#[derive(Debug, Clone)]
pub(crate) struct InputSlot {
    pub kind: DataKind,
    /// Winning connection and its converted expression
    pub source: Option<(String, String)>,
}

/// Struct field holding a block's running state
#[derive(Debug, Clone)]
pub(crate) struct StateSlot {
    pub field: String,
    pub ty: String,
    /// Initializer in `new()`, from configured values
    pub init: String,
    /// Initializer in `reset()` and the setter, from live fields
    pub reinit: String,
    /// Properties the initializer depends on
    pub depends_on: Vec<String>,
}

/// Update statement, `depth` levels below the block's base indentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    pub depth: usize,
    pub text: String,
}

pub(crate) struct BlockEmitter<'a> {
    pub block: &'a StrategyBlock,
    handle: &'a str,
    params: &'a [ParamSlot],
    outputs: &'a [OutputSlot],
    inputs: HashMap<String, InputSlot>,
    pub state: Option<StateSlot>,
    pub update: Vec<Line>,
    depth: usize,
    consumed: RefCell<Vec<(String, String)>>,
    missing: RefCell<Vec<String>>,
}

impl<'a> BlockEmitter<'a> {
    pub fn new(
        block: &'a StrategyBlock,
        handle: &'a str,
        params: &'a [ParamSlot],
        outputs: &'a [OutputSlot],
        inputs: HashMap<String, InputSlot>,
    ) -> Self {
        Self {
            block,
            handle,
            params,
            outputs,
            inputs,
            state: None,
            update: Vec::new(),
            depth: 0,
            consumed: RefCell::new(Vec::new()),
            missing: RefCell::new(Vec::new()),
        }
    }

    /// Block id as a string literal
    pub fn id_literal(&self) -> String {
        format!("{:?}", self.block.id)
    }

    fn param_slot(&self, name: &str) -> Option<&ParamSlot> {
        let slot = self.params.iter().find(|p| p.property == name);
        if slot.is_none() {
            self.missing.borrow_mut().push(format!("property '{}'", name));
        }
        slot
    }

    /// Live value of a parameter
    pub fn param(&self, name: &str) -> String {
        self.param_slot(name)
            .map(ParamSlot::read)
            .unwrap_or_else(|| "f64::NAN".to_string())
    }

    fn param_literal(&self, name: &str) -> String {
        self.param_slot(name)
            .map(ParamSlot::literal)
            .unwrap_or_else(|| "f64::NAN".to_string())
    }

    /// Input expression, or the kind's fallback when unconnected
    pub fn input(&self, name: &str) -> String {
        match self.inputs.get(&naming::slug(name)) {
            Some(slot) => self.read_input(slot, fallback(slot.kind)),
            None => self.missing_input(name),
        }
    }

    /// Input expression, or `otherwise` when unconnected
    pub fn input_or(&self, name: &str, otherwise: String) -> String {
        match self.inputs.get(&naming::slug(name)) {
            Some(slot) => self.read_input(slot, &otherwise),
            None => self.missing_input(name),
        }
    }

    fn read_input(&self, slot: &InputSlot, otherwise: &str) -> String {
        match &slot.source {
            Some((connection_id, expr)) => {
                self.consumed
                    .borrow_mut()
                    .push((connection_id.clone(), expr.clone()));
                expr.clone()
            }
            None => otherwise.to_string(),
        }
    }

    fn missing_input(&self, name: &str) -> String {
        self.missing.borrow_mut().push(format!("input '{}'", name));
        "f64::NAN".to_string()
    }

    /// Field path of an output port
    pub fn output(&self, name: &str) -> String {
        let slug = naming::slug(name);
        match self.outputs.iter().find(|o| naming::slug(&o.name) == slug) {
            Some(slot) => format!("self.{}", slot.field),
            None => {
                self.missing.borrow_mut().push(format!("output '{}'", name));
                "self.missing".to_string()
            }
        }
    }

    /// Declare the block's state field; `init` renders the initializer given
    /// a parameter reader. Returns the field path.
    pub fn state<F>(&mut self, ty: &str, init: F) -> String
    where
        F: Fn(&dyn Fn(&str) -> String) -> String,
    {
        let field = format!("s_{}", self.handle);
        let depends_on = RefCell::new(Vec::new());
        let fresh = init(&|name: &str| {
            depends_on.borrow_mut().push(name.to_string());
            self.param_literal(name)
        });
        let reinit = init(&|name: &str| self.param(name));
        self.state = Some(StateSlot {
            field: field.clone(),
            ty: ty.to_string(),
            init: fresh,
            reinit,
            depends_on: depends_on.into_inner(),
        });
        format!("self.{}", field)
    }

    pub fn line(&mut self, text: String) {
        self.update.push(Line {
            depth: self.depth,
            text,
        });
    }

    pub fn open(&mut self, text: String) {
        self.line(text);
        self.depth += 1;
    }

    pub fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}".to_string());
    }

    /// Connections whose expression the rule read, with that expression
    pub fn consumed(&self) -> Vec<(String, String)> {
        self.consumed.borrow().clone()
    }

    /// Fails if the rule referenced a member the block does not have
    pub fn check(&self) -> Result<(), CodegenError> {
        match self.missing.borrow().first() {
            Some(member) => Err(CodegenError::IncompleteBlock {
                block_id: self.block.id.clone(),
                member: member.clone(),
            }),
            None => Ok(()),
        }
    }
}
