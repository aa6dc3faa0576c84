//! Execution ordering and cycle detection over the block graph
//!
//! Blocks are addressed by their index in the definition, which is what makes
//! the ordering deterministic: among blocks that are ready at the same time the
//! one inserted first always runs first.

use std::collections::{BTreeSet, HashMap};

use shared::{BlockConnection, StrategyBlock};
use thiserror::Error;

/// The graph has no topological order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("circular dependency among blocks: {}", .blocks.join(", "))]
pub struct CycleError {
    /// Blocks left unordered, in definition order
    pub blocks: Vec<String>,
}

struct Adjacency {
    successors: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
}

impl Adjacency {
    /// Connections whose endpoints are not both present are ignored
    fn build(blocks: &[StrategyBlock], connections: &[BlockConnection]) -> Self {
        let index = block_index(blocks);
        let mut successors = vec![Vec::new(); blocks.len()];
        let mut in_degree = vec![0; blocks.len()];
        for connection in connections {
            let source = index.get(connection.source_block_id.as_str());
            let target = index.get(connection.target_block_id.as_str());
            if let (Some(&s), Some(&t)) = (source, target) {
                successors[s].push(t);
                in_degree[t] += 1;
            }
        }
        Self {
            successors,
            in_degree,
        }
    }
}

fn block_index(blocks: &[StrategyBlock]) -> HashMap<&str, usize> {
    blocks
        .iter()
        .enumerate()
        .map(|(i, b)| (b.id.as_str(), i))
        .collect()
}

/// Order blocks so every block comes after all blocks feeding it (Kahn)
pub fn order<'a>(
    blocks: &'a [StrategyBlock],
    connections: &[BlockConnection],
) -> Result<Vec<&'a StrategyBlock>, CycleError> {
    Ok(order_indices(blocks, connections)?
        .into_iter()
        .map(|i| &blocks[i])
        .collect())
}

/// Same as [`order`], as indices into `blocks`
pub fn order_indices(
    blocks: &[StrategyBlock],
    connections: &[BlockConnection],
) -> Result<Vec<usize>, CycleError> {
    let Adjacency {
        successors,
        mut in_degree,
    } = Adjacency::build(blocks, connections);

    let mut ready: BTreeSet<usize> = (0..blocks.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut ordered = Vec::with_capacity(blocks.len());

    while let Some(i) = ready.pop_first() {
        ordered.push(i);
        for &next in &successors[i] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.insert(next);
            }
        }
    }

    if ordered.len() < blocks.len() {
        let blocks = (0..blocks.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| blocks[i].id.clone())
            .collect();
        return Err(CycleError { blocks });
    }
    Ok(ordered)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Grey,
    Black,
}

/// Whether the graph contains a directed cycle (DFS with an on-stack mark)
///
/// The walk keeps its own stack of `(node, next successor)` frames so chain
/// depth is bounded by memory, not by the thread stack.
pub fn has_cycle(blocks: &[StrategyBlock], connections: &[BlockConnection]) -> bool {
    let adjacency = Adjacency::build(blocks, connections);
    let mut marks = vec![Mark::White; blocks.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for start in 0..blocks.len() {
        if marks[start] != Mark::White {
            continue;
        }
        marks[start] = Mark::Grey;
        stack.push((start, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            let Some(&next) = adjacency.successors[node].get(cursor) else {
                marks[node] = Mark::Black;
                stack.pop();
                continue;
            };
            frame.1 += 1;
            match marks[next] {
                Mark::Grey => return true,
                Mark::White => {
                    marks[next] = Mark::Grey;
                    stack.push((next, 0));
                }
                Mark::Black => {}
            }
        }
    }
    false
}

/// Whether adding `source_block_id -> target_block_id` would close a cycle
pub fn would_create_cycle(
    blocks: &[StrategyBlock],
    connections: &[BlockConnection],
    source_block_id: &str,
    target_block_id: &str,
) -> bool {
    if source_block_id == target_block_id {
        return true;
    }
    let index = block_index(blocks);
    let (Some(&source), Some(&target)) = (index.get(source_block_id), index.get(target_block_id))
    else {
        return false;
    };

    let adjacency = Adjacency::build(blocks, connections);
    let mut seen = vec![false; blocks.len()];
    let mut stack = vec![target];
    while let Some(node) = stack.pop() {
        if node == source {
            return true;
        }
        if std::mem::replace(&mut seen[node], true) {
            continue;
        }
        stack.extend(adjacency.successors[node].iter().copied());
    }
    false
}
