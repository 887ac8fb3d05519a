//! Program Order
//!
//! A linear sequence of operation nodes in which every node comes after the
//! producers of all its inputs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::model::GraphModel;
use super::node::{OperationNode, ValueId};
use crate::error::{GraphError, GraphResult};

/// A dependency-respecting sequence of operation nodes.
///
/// Positions in this sequence are the time axis for liveness and allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<OperationNode>", try_from = "Vec<OperationNode>")]
pub struct ProgramOrder {
    nodes: Vec<OperationNode>,
}

impl ProgramOrder {
    /// Wrap a sequence without checking it.
    ///
    /// Used by the sorter, whose output is valid by construction. Callers
    /// holding an arbitrary sequence should use [`ProgramOrder::validated`].
    pub(crate) fn from_nodes_unchecked(nodes: Vec<OperationNode>) -> Self {
        Self { nodes }
    }

    /// Wrap a sequence after checking that it is a valid program order.
    pub fn validated(nodes: Vec<OperationNode>) -> GraphResult<Self> {
        let order = Self { nodes };
        order.validate()?;
        Ok(order)
    }

    /// Use the graph's declaration order as the program order.
    ///
    /// Fails with `OutOfOrder` if a node is declared before one of its inputs.
    pub fn declared(graph: &GraphModel) -> GraphResult<Self> {
        Self::validated(graph.nodes().cloned().collect())
    }

    /// Check that every input of every node is produced strictly earlier and
    /// that no value is produced twice.
    pub fn validate(&self) -> GraphResult<()> {
        let mut produced: HashSet<&ValueId> = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if let Some(input) = node.inputs().iter().find(|input| !produced.contains(*input)) {
                return Err(GraphError::out_of_order(
                    node.output().clone(),
                    input.clone(),
                ));
            }
            if !produced.insert(node.output()) {
                return Err(GraphError::duplicate_output(node.output().clone()));
            }
        }
        Ok(())
    }

    /// Get the node scheduled at `position`.
    pub fn get(&self, position: usize) -> Option<&OperationNode> {
        self.nodes.get(position)
    }

    /// Get the position of the node producing `value`.
    pub fn position_of(&self, value: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.output().as_str() == value)
    }

    /// Iterate over nodes in program order.
    pub fn iter(&self) -> std::slice::Iter<'_, OperationNode> {
        self.nodes.iter()
    }

    /// Iterate over produced values in program order.
    pub fn outputs(&self) -> impl Iterator<Item = &ValueId> {
        self.nodes.iter().map(OperationNode::output)
    }

    pub fn as_slice(&self) -> &[OperationNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_nodes(self) -> Vec<OperationNode> {
        self.nodes
    }
}

impl TryFrom<Vec<OperationNode>> for ProgramOrder {
    type Error = GraphError;

    fn try_from(nodes: Vec<OperationNode>) -> GraphResult<Self> {
        Self::validated(nodes)
    }
}

impl From<ProgramOrder> for Vec<OperationNode> {
    fn from(order: ProgramOrder) -> Self {
        order.nodes
    }
}

impl<'a> IntoIterator for &'a ProgramOrder {
    type Item = &'a OperationNode;
    type IntoIter = std::slice::Iter<'a, OperationNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_order_accepted_when_valid() {
        let graph = GraphModel::new([
            OperationNode::source("a"),
            OperationNode::source("b"),
            OperationNode::new("c", ["a", "b"]),
        ])
        .unwrap();

        let order = ProgramOrder::declared(&graph).unwrap();
        assert_eq!(order.len(), 3);
        assert_eq!(order.position_of("c"), Some(2));
    }

    #[test]
    fn declared_order_rejects_forward_reference() {
        let graph = GraphModel::new([
            OperationNode::new("c", ["a"]),
            OperationNode::source("a"),
        ])
        .unwrap();

        let err = ProgramOrder::declared(&graph).unwrap_err();
        assert_eq!(
            err,
            GraphError::out_of_order(ValueId::new("c"), ValueId::new("a"))
        );
    }

    #[test]
    fn self_reference_is_out_of_order() {
        let err = ProgramOrder::validated(vec![OperationNode::new("a", ["a"])]).unwrap_err();
        assert!(matches!(err, GraphError::OutOfOrder { .. }));
    }

    #[test]
    fn repeated_output_is_rejected() {
        let err = ProgramOrder::validated(vec![
            OperationNode::source("a"),
            OperationNode::source("x"),
            OperationNode::new("a", ["x"]),
        ])
        .unwrap_err();

        assert_eq!(err, GraphError::duplicate_output(ValueId::new("a")));
    }

    #[test]
    fn deserializing_validates_the_sequence() {
        let order: ProgramOrder =
            serde_json::from_str(r#"[{"output": "a"}, {"output": "b", "inputs": ["a"]}]"#)
                .unwrap();
        assert_eq!(order.len(), 2);

        let repeated = serde_json::from_str::<ProgramOrder>(
            r#"[{"output": "a"}, {"output": "x"}, {"output": "a", "inputs": ["x"]}]"#,
        );
        assert!(repeated.is_err());

        let backwards = serde_json::from_str::<ProgramOrder>(
            r#"[{"output": "b", "inputs": ["a"]}, {"output": "a"}]"#,
        );
        assert!(backwards.is_err());
    }
}
