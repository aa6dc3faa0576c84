//! Strategy document model
//!
//! The persisted shape of a block strategy: blocks with their typed ports and
//! properties, the connections wiring them together, and the aggregate
//! `StrategyDefinition` that owns both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Semantic type of a port's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Number,
    Boolean,
    String,
    Candle,
    Indicator,
    Signal,
    Order,
    Array,
    Any,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Number => "number",
            DataKind::Boolean => "boolean",
            DataKind::String => "string",
            DataKind::Candle => "candle",
            DataKind::Indicator => "indicator",
            DataKind::Signal => "signal",
            DataKind::Order => "order",
            DataKind::Array => "array",
            DataKind::Any => "any",
        }
    }

    /// Number, boolean and string values
    pub fn is_scalar(&self) -> bool {
        matches!(self, DataKind::Number | DataKind::Boolean | DataKind::String)
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Block category, used by the editor palette and by data-flow checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockCategory {
    /// Market data sources
    Data,
    Indicator,
    Logic,
    Math,
    /// Order actions
    Action,
    Output,
}

impl BlockCategory {
    /// Action and output blocks are the ones with an observable effect
    pub fn has_effect(&self) -> bool {
        matches!(self, BlockCategory::Action | BlockCategory::Output)
    }
}

/// Canvas position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Canvas size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 100.0,
        }
    }
}

/// Kind of a configurable block property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Number,
    String,
    Boolean,
    Select,
}

/// Current value of a block property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Blank text counts as empty; numbers and booleans never do
    pub fn is_empty(&self) -> bool {
        match self {
            PropertyValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Whether this value is the right shape for a property of `kind`
    pub fn matches_kind(&self, kind: PropertyKind) -> bool {
        matches!(
            (self, kind),
            (PropertyValue::Number(_), PropertyKind::Number)
                | (PropertyValue::Boolean(_), PropertyKind::Boolean)
                | (PropertyValue::Text(_), PropertyKind::String)
                | (PropertyValue::Text(_), PropertyKind::Select)
        )
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

/// One choice of a `select` property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// Input slot on a block instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputPort {
    pub id: String,
    pub name: String,
    pub data_kind: DataKind,
    pub required: bool,
}

/// Output slot on a block instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPort {
    pub id: String,
    pub name: String,
    pub data_kind: DataKind,
}

/// Configured property on a block instance, carrying the template constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockProperty {
    pub name: String,
    pub label: String,
    pub kind: PropertyKind,
    #[serde(default)]
    pub value: Option<PropertyValue>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

/// Block instance placed on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub category: BlockCategory,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub inputs: Vec<InputPort>,
    #[serde(default)]
    pub outputs: Vec<OutputPort>,
    #[serde(default)]
    pub properties: Vec<BlockProperty>,
}

impl StrategyBlock {
    pub fn input(&self, port_id: &str) -> Option<&InputPort> {
        self.inputs.iter().find(|p| p.id == port_id)
    }

    pub fn output(&self, port_id: &str) -> Option<&OutputPort> {
        self.outputs.iter().find(|p| p.id == port_id)
    }

    pub fn input_named(&self, name: &str) -> Option<&InputPort> {
        self.inputs.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn output_named(&self, name: &str) -> Option<&OutputPort> {
        self.outputs.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn property(&self, name: &str) -> Option<&BlockProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut BlockProperty> {
        self.properties.iter_mut().find(|p| p.name == name)
    }

    /// Blocks without inputs are entry points of the data flow
    pub fn is_entry_point(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Directed, typed edge from one output port to one input port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockConnection {
    pub id: String,
    pub source_block_id: String,
    pub source_output_id: String,
    pub target_block_id: String,
    pub target_input_id: String,
    /// Copied from the source output when the connection is created
    pub data_kind: DataKind,
}

impl BlockConnection {
    pub fn touches(&self, block_id: &str) -> bool {
        self.source_block_id == block_id || self.target_block_id == block_id
    }

    /// Same source output feeding the same target input
    pub fn same_endpoints(&self, other: &BlockConnection) -> bool {
        self.source_output_id == other.source_output_id
            && self.target_input_id == other.target_input_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Aggregate root of a block strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: u32,
    #[serde(default)]
    pub blocks: Vec<StrategyBlock>,
    #[serde(default)]
    pub connections: Vec<BlockConnection>,
    pub metadata: StrategyMetadata,
}

impl StrategyDefinition {
    /// Create an empty strategy at version 1
    pub fn new(id: &str, name: &str, created_by: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            version: 1,
            blocks: Vec::new(),
            connections: Vec::new(),
            metadata: StrategyMetadata {
                created_at: now,
                updated_at: now,
                created_by: created_by.to_string(),
                tags: Vec::new(),
            },
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: &str) -> Option<&StrategyBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn block_mut(&mut self, id: &str) -> Option<&mut StrategyBlock> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn connection(&self, id: &str) -> Option<&BlockConnection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Connections ending at `block_id`, in definition order
    pub fn incoming(&self, block_id: &str) -> Vec<&BlockConnection> {
        self.connections
            .iter()
            .filter(|c| c.target_block_id == block_id)
            .collect()
    }

    /// Connections starting at `block_id`, in definition order
    pub fn outgoing(&self, block_id: &str) -> Vec<&BlockConnection> {
        self.connections
            .iter()
            .filter(|c| c.source_block_id == block_id)
            .collect()
    }

    /// Connections feeding a specific input port, in definition order
    pub fn feeding(&self, target_input_id: &str) -> Vec<&BlockConnection> {
        self.connections
            .iter()
            .filter(|c| c.target_input_id == target_input_id)
            .collect()
    }

    pub fn connections_touching(&self, block_id: &str) -> Vec<&BlockConnection> {
        self.connections.iter().filter(|c| c.touches(block_id)).collect()
    }
}
