//! Graph Model
//!
//! The validated, immutable set of operation nodes. Construction rejects
//! duplicate producers and dangling input references; nothing else is
//! checked here.

use indexmap::IndexMap;

use super::node::{OperationNode, ValueId};
use crate::error::{GraphError, GraphResult};

/// A closed, duplicate-free collection of operation nodes.
///
/// Nodes are kept in declaration order, which every downstream pass relies on
/// for deterministic output.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    /// Nodes indexed by the value they produce.
    nodes: IndexMap<ValueId, OperationNode>,
}

impl GraphModel {
    /// Build a model from node descriptors in declaration order.
    ///
    /// Fails with `DuplicateOutput` if two nodes produce the same value and
    /// with `UnknownInput` if a node reads a value nobody produces.
    pub fn new(nodes: impl IntoIterator<Item = OperationNode>) -> GraphResult<Self> {
        let mut by_output = IndexMap::new();
        for node in nodes {
            if by_output.contains_key(node.output()) {
                return Err(GraphError::duplicate_output(node.output().clone()));
            }
            by_output.insert(node.output().clone(), node);
        }

        for node in by_output.values() {
            if let Some(input) = node
                .inputs()
                .iter()
                .find(|input| !by_output.contains_key(*input))
            {
                return Err(GraphError::unknown_input(
                    node.output().clone(),
                    input.clone(),
                ));
            }
        }

        tracing::debug!(nodes = by_output.len(), "graph model built");
        Ok(Self { nodes: by_output })
    }

    /// Get the node producing `value`.
    pub fn producer(&self, value: &str) -> Option<&OperationNode> {
        self.nodes.get(value)
    }

    /// Get the inputs of the node producing `value`.
    pub fn inputs_of(&self, value: &str) -> Option<&[ValueId]> {
        self.nodes.get(value).map(OperationNode::inputs)
    }

    /// Check if some node produces `value`.
    pub fn contains(&self, value: &str) -> bool {
        self.nodes.contains_key(value)
    }

    /// Iterate over nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &OperationNode> {
        self.nodes.values()
    }

    /// Get the declaration index of the node producing `value`.
    pub(crate) fn index_of(&self, value: &str) -> Option<usize> {
        self.nodes.get_index_of(value)
    }

    /// Get the total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
