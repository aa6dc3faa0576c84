//! Editing operations on a strategy snapshot
//!
//! `apply` never mutates its input: it returns the next snapshot or the reason
//! the operation was refused.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    BlockConnection, DataKind, Position, PropertyKind, PropertyValue, Size, StrategyDefinition,
};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{BlockCatalog, BlockType};
use crate::topology;
use crate::validation::{ConnectionValidator, ValidationError};

/// One editor mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GraphOp {
    AddBlock {
        block_id: String,
        block_type: BlockType,
        position: Position,
    },
    MoveBlock {
        block_id: String,
        position: Position,
    },
    ResizeBlock {
        block_id: String,
        size: Size,
    },
    /// Also removes every connection touching the block
    DeleteBlock { block_id: String },
    AddConnection {
        connection_id: String,
        source_block_id: String,
        source_output_id: String,
        target_block_id: String,
        target_input_id: String,
    },
    DeleteConnection { connection_id: String },
    UpdateProperty {
        block_id: String,
        property: String,
        value: PropertyValue,
    },
    RenameStrategy { name: String },
    SetTags { tags: Vec<String> },
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("block '{0}' not found")]
    BlockNotFound(String),

    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("block id '{0}' already exists")]
    DuplicateBlockId(String),

    #[error("connection id '{0}' already exists")]
    DuplicateConnectionId(String),

    #[error("no template registered for block type '{0}'")]
    MissingTemplate(BlockType),

    #[error("block '{block_id}' has no property '{property}'")]
    UnknownProperty { block_id: String, property: String },

    #[error("property '{property}' of block '{block_id}' expects a {expected:?} value")]
    PropertyKindMismatch {
        block_id: String,
        property: String,
        expected: PropertyKind,
    },

    #[error("block size must be positive, got {width}x{height}")]
    InvalidSize { width: f64, height: f64 },

    #[error("connection rejected: {}", summarize(.0))]
    ConnectionRejected(Vec<ValidationError>),

    #[error("connecting '{source_block_id}' to '{target_block_id}' would create a cycle")]
    WouldCreateCycle {
        source_block_id: String,
        target_block_id: String,
    },
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Fresh id for a block placed by the editor
pub fn new_block_id() -> String {
    format!("block-{}", Uuid::new_v4())
}

/// Fresh id for a connection drawn by the editor
pub fn new_connection_id() -> String {
    format!("conn-{}", Uuid::new_v4())
}

/// Apply one operation, returning the next snapshot
pub fn apply(
    definition: &StrategyDefinition,
    op: GraphOp,
    catalog: &BlockCatalog,
) -> Result<StrategyDefinition, EditError> {
    let mut next = definition.clone();

    match op {
        GraphOp::AddBlock {
            block_id,
            block_type,
            position,
        } => {
            if next.block(&block_id).is_some() {
                return Err(EditError::DuplicateBlockId(block_id));
            }
            let block = catalog
                .instantiate(block_type, &block_id, position)
                .ok_or(EditError::MissingTemplate(block_type))?;
            next.blocks.push(block);
        }
        GraphOp::MoveBlock { block_id, position } => {
            let block = next
                .block_mut(&block_id)
                .ok_or_else(|| EditError::BlockNotFound(block_id.clone()))?;
            block.position = position;
        }
        GraphOp::ResizeBlock { block_id, size } => {
            let drawable = |side: f64| side > 0.0 && side.is_finite();
            if !(drawable(size.width) && drawable(size.height)) {
                return Err(EditError::InvalidSize {
                    width: size.width,
                    height: size.height,
                });
            }
            let block = next
                .block_mut(&block_id)
                .ok_or_else(|| EditError::BlockNotFound(block_id.clone()))?;
            block.size = size;
        }
        GraphOp::DeleteBlock { block_id } => {
            if next.block(&block_id).is_none() {
                return Err(EditError::BlockNotFound(block_id));
            }
            next.blocks.retain(|b| b.id != block_id);
            let before = next.connections.len();
            next.connections.retain(|c| !c.touches(&block_id));
            tracing::debug!(
                block_id = %block_id,
                removed_connections = before - next.connections.len(),
                "block deleted"
            );
        }
        GraphOp::AddConnection {
            connection_id,
            source_block_id,
            source_output_id,
            target_block_id,
            target_input_id,
        } => {
            if next.connection(&connection_id).is_some() {
                return Err(EditError::DuplicateConnectionId(connection_id));
            }
            let data_kind = next
                .block(&source_block_id)
                .and_then(|b| b.output(&source_output_id))
                .map(|p| p.data_kind)
                .unwrap_or(DataKind::Any);
            let candidate = BlockConnection {
                id: connection_id,
                source_block_id,
                source_output_id,
                target_block_id,
                target_input_id,
                data_kind,
            };

            let issues = ConnectionValidator::validate(&candidate, &next.blocks, &next.connections);
            let (errors, warnings): (Vec<_>, Vec<_>) = issues.into_iter().partition(|i| i.is_error());
            if !errors.is_empty() {
                tracing::warn!(
                    strategy_id = %next.id,
                    connection_id = %candidate.id,
                    error_count = errors.len(),
                    "connection rejected"
                );
                return Err(EditError::ConnectionRejected(errors));
            }
            if topology::would_create_cycle(
                &next.blocks,
                &next.connections,
                &candidate.source_block_id,
                &candidate.target_block_id,
            ) {
                tracing::warn!(
                    strategy_id = %next.id,
                    connection_id = %candidate.id,
                    "connection would create a cycle"
                );
                return Err(EditError::WouldCreateCycle {
                    source_block_id: candidate.source_block_id,
                    target_block_id: candidate.target_block_id,
                });
            }
            for warning in &warnings {
                tracing::debug!(connection_id = %candidate.id, code = %warning.code, "{}", warning.message);
            }
            next.connections.push(candidate);
        }
        GraphOp::DeleteConnection { connection_id } => {
            if next.connection(&connection_id).is_none() {
                return Err(EditError::ConnectionNotFound(connection_id));
            }
            next.connections.retain(|c| c.id != connection_id);
        }
        GraphOp::UpdateProperty {
            block_id,
            property,
            value,
        } => {
            let block = next
                .block_mut(&block_id)
                .ok_or_else(|| EditError::BlockNotFound(block_id.clone()))?;
            let Some(slot) = block.property_mut(&property) else {
                return Err(EditError::UnknownProperty { block_id, property });
            };
            if !value.matches_kind(slot.kind) {
                return Err(EditError::PropertyKindMismatch {
                    block_id,
                    property,
                    expected: slot.kind,
                });
            }
            slot.value = Some(value);
        }
        GraphOp::RenameStrategy { name } => {
            next.name = name;
        }
        GraphOp::SetTags { tags } => {
            next.metadata.tags = tags;
        }
    }

    Ok(next)
}

/// Snapshot to persist: version bumped, `updated_at` set to `now`
pub fn save(definition: &StrategyDefinition, now: DateTime<Utc>) -> StrategyDefinition {
    let mut saved = definition.clone();
    saved.version += 1;
    saved.metadata.updated_at = now;
    tracing::info!(strategy_id = %saved.id, version = saved.version, "strategy saved");
    saved
}
