//! Single-connection checks

use std::collections::{HashMap, HashSet};

use shared::{BlockConnection, StrategyBlock};

use crate::compat;
use crate::validation::{ErrorCode, ValidationError};

/// Connection validator
pub struct ConnectionValidator;

impl ConnectionValidator {
    /// Validate one connection against the blocks and the connections already
    /// present
    ///
    /// `existing` may contain `candidate` itself (matched by id); it is never
    /// compared against itself.
    pub fn validate(
        candidate: &BlockConnection,
        blocks: &[StrategyBlock],
        existing: &[BlockConnection],
    ) -> Vec<ValidationError> {
        let mut index = ConnectionIndex::new(blocks);
        for connection in existing {
            index.insert(connection);
        }
        index.check(candidate)
    }
}

/// Lookup tables for checking many connections against one graph
///
/// Checking a connection costs O(1) lookups plus the ports of its two blocks,
/// so validating every connection of a strategy stays linear.
pub struct ConnectionIndex<'a> {
    blocks: HashMap<&'a str, &'a StrategyBlock>,
    // (source output, target input) -> connection ids
    endpoints: HashMap<(&'a str, &'a str), HashSet<&'a str>>,
    // target input -> connection ids
    inputs: HashMap<&'a str, HashSet<&'a str>>,
}

impl<'a> ConnectionIndex<'a> {
    /// Index `blocks`; the first block wins when ids repeat
    pub fn new(blocks: &'a [StrategyBlock]) -> Self {
        let mut by_id = HashMap::with_capacity(blocks.len());
        for block in blocks {
            by_id.entry(block.id.as_str()).or_insert(block);
        }
        Self {
            blocks: by_id,
            endpoints: HashMap::new(),
            inputs: HashMap::new(),
        }
    }

    /// Record a connection later candidates are compared against
    pub fn insert(&mut self, connection: &'a BlockConnection) {
        self.endpoints
            .entry((
                connection.source_output_id.as_str(),
                connection.target_input_id.as_str(),
            ))
            .or_default()
            .insert(connection.id.as_str());
        self.inputs
            .entry(connection.target_input_id.as_str())
            .or_default()
            .insert(connection.id.as_str());
    }

    /// Check `candidate` against the indexed blocks and recorded connections
    pub fn check(&self, candidate: &BlockConnection) -> Vec<ValidationError> {
        let mut issues = Vec::new();
        let invalid = |message: String| {
            ValidationError::error(ErrorCode::InvalidConnection, message)
                .with_connection(&candidate.id)
        };

        let source = self.blocks.get(candidate.source_block_id.as_str());
        let target = self.blocks.get(candidate.target_block_id.as_str());
        let (source, target) = match (source, target) {
            (Some(s), Some(t)) => (*s, *t),
            (source, _) => {
                let missing = if source.is_none() {
                    &candidate.source_block_id
                } else {
                    &candidate.target_block_id
                };
                issues.push(invalid(format!(
                    "Connection references missing block '{}'",
                    missing
                )));
                return issues;
            }
        };

        let output = source.output(&candidate.source_output_id);
        let input = target.input(&candidate.target_input_id);
        if output.is_none() {
            issues.push(
                invalid(format!(
                    "Block '{}' has no output '{}'",
                    source.name, candidate.source_output_id
                ))
                .with_block(&source.id),
            );
        }
        if input.is_none() {
            issues.push(
                invalid(format!(
                    "Block '{}' has no input '{}'",
                    target.name, candidate.target_input_id
                ))
                .with_block(&target.id),
            );
        }
        let (output, input) = match (output, input) {
            (Some(o), Some(i)) => (o, i),
            _ => return issues,
        };

        if source.id == target.id {
            issues.push(
                invalid(format!("Block '{}' cannot be connected to itself", source.name))
                    .with_block(&source.id),
            );
        }

        let key = (
            candidate.source_output_id.as_str(),
            candidate.target_input_id.as_str(),
        );
        let duplicate = has_other(self.endpoints.get(&key), &candidate.id);
        if duplicate {
            issues.push(
                ValidationError::error(
                    ErrorCode::DuplicateConnection,
                    format!(
                        "'{}.{}' is already connected to '{}.{}'",
                        source.name, output.name, target.name, input.name
                    ),
                )
                .with_connection(&candidate.id),
            );
        }

        if !compat::is_compatible(output.data_kind, input.data_kind) {
            let suggestion = match compat::conversion_hint(output.data_kind, input.data_kind) {
                Some(block) => format!("Insert a {} block to convert between these types", block),
                None => "Insert a converting block between these ports".to_string(),
            };
            issues.push(
                ValidationError::error(
                    ErrorCode::TypeMismatch,
                    format!(
                        "Cannot connect {} output '{}' to {} input '{}'",
                        output.data_kind, output.name, input.data_kind, input.name
                    ),
                )
                .with_connection(&candidate.id)
                .with_block(&target.id)
                .with_suggestion(suggestion),
            );
        }

        let shared_input = self.inputs.get(candidate.target_input_id.as_str());
        if !duplicate && has_other(shared_input, &candidate.id) {
            issues.push(
                ValidationError::warning(
                    ErrorCode::MultipleInputs,
                    format!(
                        "Input '{}' of '{}' has more than one connection; the last one wins",
                        input.name, target.name
                    ),
                )
                .with_connection(&candidate.id)
                .with_block(&target.id),
            );
        }

        issues
    }
}

/// Whether the set holds a connection id other than `id`
fn has_other(ids: Option<&HashSet<&str>>, id: &str) -> bool {
    ids.map_or(false, |ids| ids.len() > 1 || (ids.len() == 1 && !ids.contains(id)))
}
