//! Mapping from generated lines back to blocks and connections

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Part of the generated code a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Struct field declarations for state and outputs
    State,
    /// `new()`
    Init,
    /// `execute()`
    Update,
    /// `reset()`
    Reset,
    /// Parameter fields, getter, setter and key list
    Parameter,
}

/// 1-based position in the generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub section: Section,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMap {
    pub blocks: BTreeMap<String, Vec<SourceLocation>>,
    pub connections: BTreeMap<String, Vec<SourceLocation>>,
}

impl SourceMap {
    pub(crate) fn add_block(&mut self, block_id: &str, location: SourceLocation) {
        self.blocks
            .entry(block_id.to_string())
            .or_default()
            .push(location);
    }

    pub(crate) fn add_connection(&mut self, connection_id: &str, location: SourceLocation) {
        self.connections
            .entry(connection_id.to_string())
            .or_default()
            .push(location);
    }

    pub fn block_locations(&self, block_id: &str) -> &[SourceLocation] {
        self.blocks.get(block_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn connection_locations(&self, connection_id: &str) -> &[SourceLocation] {
        self.connections
            .get(connection_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Block that produced `line`
    pub fn block_at(&self, line: usize) -> Option<&str> {
        self.blocks
            .iter()
            .find(|(_, locations)| locations.iter().any(|l| l.line == line))
            .map(|(id, _)| id.as_str())
    }

    /// First connection (by id) whose value is read on `line`
    pub fn connection_at(&self, line: usize) -> Option<&str> {
        self.connections_at(line).into_iter().next()
    }

    pub fn connections_at(&self, line: usize) -> Vec<&str> {
        self.connections
            .iter()
            .filter(|(_, locations)| locations.iter().any(|l| l.line == line))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}
