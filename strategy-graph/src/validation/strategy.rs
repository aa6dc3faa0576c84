//! Whole-strategy validation

use std::collections::HashSet;

use shared::{BlockProperty, PropertyKind, PropertyValue, StrategyBlock, StrategyDefinition};

use crate::topology;
use crate::validation::{ConnectionIndex, ErrorCode, ValidationError, ValidationReport};

/// Strategy validator
pub struct StrategyValidator;

impl StrategyValidator {
    /// Validate a strategy definition
    ///
    /// Returns every finding; an empty list means the strategy is clean.
    pub fn validate(definition: &StrategyDefinition) -> Vec<ValidationError> {
        let mut issues = Vec::new();

        // Check strategy name is not empty
        if definition.name.trim().is_empty() {
            issues.push(ValidationError::error(
                ErrorCode::MissingName,
                "Strategy name cannot be empty",
            ));
        }

        if definition.is_empty() {
            issues.push(
                ValidationError::warning(ErrorCode::EmptyStrategy, "Strategy has no blocks")
                    .with_suggestion("Add a Market Data block to get started"),
            );
            return issues;
        }

        Self::check_blocks(definition, &mut issues);

        // Each connection is checked against the ones defined before it
        let mut index = ConnectionIndex::new(&definition.blocks);
        for connection in &definition.connections {
            issues.extend(index.check(connection));
            index.insert(connection);
        }

        Self::check_data_flow(definition, &mut issues);
        Self::check_orphans(definition, &mut issues);

        if topology::has_cycle(&definition.blocks, &definition.connections) {
            issues.push(
                ValidationError::error(
                    ErrorCode::CircularDependency,
                    "Strategy contains a circular dependency",
                )
                .with_suggestion("Remove one of the connections forming the loop"),
            );
        }

        tracing::debug!(
            strategy_id = %definition.id,
            block_count = definition.blocks.len(),
            connection_count = definition.connections.len(),
            error_count = issues.iter().filter(|i| i.is_error()).count(),
            warning_count = issues.iter().filter(|i| !i.is_error()).count(),
            "strategy validated"
        );
        issues
    }

    /// Validate and wrap the findings
    pub fn report(definition: &StrategyDefinition) -> ValidationReport {
        ValidationReport::new(Self::validate(definition))
    }

    fn check_blocks(definition: &StrategyDefinition, issues: &mut Vec<ValidationError>) {
        let mut block_ids = HashSet::new();
        let mut port_ids = HashSet::new();

        for block in &definition.blocks {
            if !block_ids.insert(block.id.as_str()) {
                issues.push(
                    ValidationError::error(
                        ErrorCode::DuplicateId,
                        format!("Block id '{}' is used more than once", block.id),
                    )
                    .with_block(&block.id),
                );
            }

            let ports = block
                .inputs
                .iter()
                .map(|p| p.id.as_str())
                .chain(block.outputs.iter().map(|p| p.id.as_str()));
            for port_id in ports {
                if !port_ids.insert(port_id) {
                    issues.push(
                        ValidationError::error(
                            ErrorCode::DuplicateId,
                            format!("Port id '{}' is used more than once", port_id),
                        )
                        .with_block(&block.id),
                    );
                }
            }

            for property in &block.properties {
                if let Some(issue) = Self::check_property(block, property) {
                    issues.push(issue.with_block(&block.id));
                }
            }
        }
    }

    fn check_property(block: &StrategyBlock, property: &BlockProperty) -> Option<ValidationError> {
        let value = match &property.value {
            Some(value) if !value.is_empty() => value,
            _ if property.required => {
                return Some(ValidationError::error(
                    ErrorCode::MissingProperty,
                    format!("'{}' requires a value for '{}'", block.name, property.label),
                ));
            }
            _ => return None,
        };

        if !value.matches_kind(property.kind) {
            return Some(ValidationError::error(
                ErrorCode::InvalidPropertyType,
                format!(
                    "'{}' of '{}' must be a {} value",
                    property.label,
                    block.name,
                    kind_name(property.kind)
                ),
            ));
        }

        match value {
            PropertyValue::Number(n) => {
                let below = property.min.map_or(false, |min| *n < min);
                let above = property.max.map_or(false, |max| *n > max);
                if below || above || !n.is_finite() {
                    return Some(ValidationError::error(
                        ErrorCode::PropertyOutOfRange,
                        format!(
                            "'{}' of '{}' is {}, expected {}",
                            property.label,
                            block.name,
                            n,
                            range_text(property.min, property.max)
                        ),
                    ));
                }
            }
            PropertyValue::Text(text) if property.kind == PropertyKind::Select => {
                if !property.options.is_empty() && !property.options.iter().any(|o| &o.value == text)
                {
                    let allowed = property
                        .options
                        .iter()
                        .map(|o| o.value.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Some(
                        ValidationError::error(
                            ErrorCode::InvalidOption,
                            format!(
                                "'{}' is not a valid option for '{}' of '{}'",
                                text, property.label, block.name
                            ),
                        )
                        .with_suggestion(format!("Choose one of: {}", allowed)),
                    );
                }
            }
            _ => {}
        }
        None
    }

    fn check_data_flow(definition: &StrategyDefinition, issues: &mut Vec<ValidationError>) {
        if !definition.blocks.iter().any(|b| b.is_entry_point()) {
            issues.push(
                ValidationError::warning(
                    ErrorCode::NoInputBlocks,
                    "Strategy has no data source blocks",
                )
                .with_suggestion("Add a Market Data block"),
            );
        }

        if !definition.blocks.iter().any(|b| b.category.has_effect()) {
            issues.push(
                ValidationError::error(
                    ErrorCode::NoOutputBlocks,
                    "Strategy has no action or output blocks",
                )
                .with_suggestion("Add a Buy Order, Sell Order or Alert block"),
            );
        }

        let connected: HashSet<(&str, &str)> = definition
            .connections
            .iter()
            .map(|c| (c.target_block_id.as_str(), c.target_input_id.as_str()))
            .collect();
        for block in &definition.blocks {
            for input in block.inputs.iter().filter(|p| p.required) {
                if !connected.contains(&(block.id.as_str(), input.id.as_str())) {
                    issues.push(
                        ValidationError::error(
                            ErrorCode::MissingConnection,
                            format!(
                                "Required input '{}' of '{}' ({}) is not connected",
                                input.name, block.name, block.id
                            ),
                        )
                        .with_block(&block.id),
                    );
                }
            }
        }
    }

    fn check_orphans(definition: &StrategyDefinition, issues: &mut Vec<ValidationError>) {
        let touched: HashSet<&str> = definition
            .connections
            .iter()
            .flat_map(|c| [c.source_block_id.as_str(), c.target_block_id.as_str()])
            .collect();
        for block in &definition.blocks {
            if block.inputs.is_empty() || block.outputs.is_empty() {
                continue;
            }
            if !touched.contains(block.id.as_str()) {
                issues.push(
                    ValidationError::warning(
                        ErrorCode::OrphanedBlock,
                        format!("'{}' is not connected to anything", block.name),
                    )
                    .with_block(&block.id)
                    .with_suggestion("Connect the block or remove it"),
                );
            }
        }
    }
}

fn kind_name(kind: PropertyKind) -> &'static str {
    match kind {
        PropertyKind::Number => "number",
        PropertyKind::String | PropertyKind::Select => "text",
        PropertyKind::Boolean => "boolean",
    }
}

fn range_text(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("between {} and {}", min, max),
        (Some(min), None) => format!("at least {}", min),
        (None, Some(max)) => format!("at most {}", max),
        (None, None) => "a finite number".to_string(),
    }
}
