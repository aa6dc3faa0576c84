//! Block catalog
//!
//! Static registry of block templates. A template describes the typed ports,
//! configurable properties and default geometry of one [`BlockType`]; the
//! editor instantiates templates onto the canvas and never mutates them.

pub mod block_type;
mod builtin;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shared::{
    BlockCategory, BlockProperty, DataKind, InputPort, OutputPort, Position, PropertyKind,
    PropertyValue, SelectOption, Size, StrategyBlock,
};

use crate::naming;

pub use block_type::{BlockType, UnknownBlockType};

/// Input port definition on a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub name: String,
    pub data_kind: DataKind,
    pub required: bool,
}

/// Output port definition on a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    pub data_kind: DataKind,
}

/// Configurable property definition on a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    pub label: String,
    pub kind: PropertyKind,
    pub default: Option<PropertyValue>,
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub options: Vec<SelectOption>,
}

impl PropertySpec {
    fn new(name: &str, label: &str, kind: PropertyKind, default: Option<PropertyValue>) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            default,
            required: false,
            min: None,
            max: None,
            options: Vec::new(),
        }
    }

    pub fn number(name: &str, label: &str, default: f64) -> Self {
        Self::new(name, label, PropertyKind::Number, Some(default.into()))
    }

    pub fn text(name: &str, label: &str, default: &str) -> Self {
        Self::new(name, label, PropertyKind::String, Some(default.into()))
    }

    pub fn boolean(name: &str, label: &str, default: bool) -> Self {
        Self::new(name, label, PropertyKind::Boolean, Some(default.into()))
    }

    /// `options` are `(value, label)` pairs
    pub fn select(name: &str, label: &str, default: &str, options: &[(&str, &str)]) -> Self {
        let mut spec = Self::new(name, label, PropertyKind::Select, Some(default.into()));
        spec.options = options
            .iter()
            .map(|(value, label)| SelectOption::new(label, value))
            .collect();
        spec
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Immutable description of a block kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTemplate {
    pub block_type: BlockType,
    pub category: BlockCategory,
    pub name: String,
    pub description: String,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
    pub properties: Vec<PropertySpec>,
    pub default_size: Size,
}

impl BlockTemplate {
    /// Create a block instance of this template
    ///
    /// Port ids are derived from `block_id`, so distinct block ids give
    /// distinct port ids across a whole definition.
    pub fn instantiate(&self, block_id: &str, position: Position) -> StrategyBlock {
        StrategyBlock {
            id: block_id.to_string(),
            block_type: self.block_type.as_str().to_string(),
            category: self.category,
            name: self.name.clone(),
            description: self.description.clone(),
            position,
            size: self.default_size,
            inputs: self
                .inputs
                .iter()
                .map(|spec| InputPort {
                    id: naming::input_port_id(block_id, &spec.name),
                    name: spec.name.clone(),
                    data_kind: spec.data_kind,
                    required: spec.required,
                })
                .collect(),
            outputs: self
                .outputs
                .iter()
                .map(|spec| OutputPort {
                    id: naming::output_port_id(block_id, &spec.name),
                    name: spec.name.clone(),
                    data_kind: spec.data_kind,
                })
                .collect(),
            properties: self
                .properties
                .iter()
                .map(|spec| BlockProperty {
                    name: spec.name.clone(),
                    label: spec.label.clone(),
                    kind: spec.kind,
                    value: spec.default.clone(),
                    required: spec.required,
                    min: spec.min,
                    max: spec.max,
                    options: spec.options.clone(),
                })
                .collect(),
        }
    }
}

/// Block Catalog - registry of block templates
#[derive(Debug, Clone)]
pub struct BlockCatalog {
    templates: Vec<BlockTemplate>,
    index: HashMap<BlockType, usize>,
}

impl BlockCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Catalog with every built-in block type registered
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for template in builtin::templates() {
            catalog.register(template);
        }
        catalog
    }

    /// Register a template, replacing any previous one of the same type
    pub fn register(&mut self, template: BlockTemplate) {
        match self.index.get(&template.block_type) {
            Some(&i) => self.templates[i] = template,
            None => {
                self.index.insert(template.block_type, self.templates.len());
                self.templates.push(template);
            }
        }
    }

    pub fn template(&self, block_type: BlockType) -> Option<&BlockTemplate> {
        self.index.get(&block_type).map(|&i| &self.templates[i])
    }

    /// Look up by the string tag used in documents
    pub fn template_for_tag(&self, tag: &str) -> Option<&BlockTemplate> {
        tag.parse().ok().and_then(|t| self.template(t))
    }

    /// All templates in registration order
    pub fn templates(&self) -> &[BlockTemplate] {
        &self.templates
    }

    pub fn by_category(&self, category: BlockCategory) -> Vec<&BlockTemplate> {
        self.templates
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }

    pub fn has_template(&self, block_type: BlockType) -> bool {
        self.index.contains_key(&block_type)
    }

    /// Instantiate a template at a canvas position
    pub fn instantiate(
        &self,
        block_type: BlockType,
        block_id: &str,
        position: Position,
    ) -> Option<StrategyBlock> {
        self.template(block_type)
            .map(|t| t.instantiate(block_id, position))
    }
}

impl Default for BlockCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_block_type() {
        let catalog = BlockCatalog::builtin();
        assert_eq!(catalog.templates().len(), BlockType::ALL.len());
        for t in BlockType::ALL {
            assert!(catalog.has_template(t), "missing template for {}", t);
        }
    }

    #[test]
    fn test_instantiate_derives_port_ids() {
        let catalog = BlockCatalog::builtin();
        let block = catalog
            .instantiate(BlockType::BuyOrder, "buy-1", Position::new(40.0, 80.0))
            .unwrap();
        assert_eq!(block.block_type, "buy_order");
        assert_eq!(block.category, BlockCategory::Action);
        assert_eq!(block.position, Position::new(40.0, 80.0));

        let condition = block.input_named("Condition").unwrap();
        assert_eq!(condition.id, "buy-1:in:condition");
        assert!(condition.required);
        assert_eq!(condition.data_kind, DataKind::Boolean);
        assert_eq!(block.output_named("Order").unwrap().id, "buy-1:out:order");
    }

    #[test]
    fn test_instantiate_copies_property_defaults_and_constraints() {
        let catalog = BlockCatalog::builtin();
        let rsi = catalog
            .instantiate(BlockType::Rsi, "r", Position::default())
            .unwrap();
        let period = rsi.property("period").unwrap();
        assert_eq!(period.value, Some(PropertyValue::Number(14.0)));
        assert_eq!(period.min, Some(2.0));
        assert_eq!(period.max, Some(100.0));
        assert!(period.required);
    }

    #[test]
    fn test_by_category_and_tag_lookup() {
        let catalog = BlockCatalog::builtin();
        let indicators = catalog.by_category(BlockCategory::Indicator);
        assert_eq!(indicators.len(), 5);
        assert!(catalog.template_for_tag("macd").is_some());
        assert!(catalog.template_for_tag("vwap").is_none());
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut catalog = BlockCatalog::builtin();
        let mut custom = catalog.template(BlockType::Sma).unwrap().clone();
        custom.name = "Moving Average".to_string();
        catalog.register(custom);
        assert_eq!(catalog.templates().len(), BlockType::ALL.len());
        assert_eq!(catalog.template(BlockType::Sma).unwrap().name, "Moving Average");
    }

    #[test]
    fn test_data_blocks_are_entry_points() {
        for template in BlockCatalog::builtin().templates() {
            if template.category == BlockCategory::Data {
                assert!(template.inputs.is_empty(), "{} should be an entry point", template.name);
            }
        }
    }
}
