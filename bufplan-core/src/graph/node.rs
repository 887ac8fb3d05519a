//! Graph Nodes
//!
//! This module defines the value identifiers and operation nodes that make up
//! a dataflow graph.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Input list of a node. Most operations read a handful of values.
pub type Inputs = SmallVec<[ValueId; 4]>;

/// Unique name of a value produced by exactly one node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueId(String);

impl ValueId {
    /// Create an identifier from any string-like name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ValueId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ValueId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for ValueId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A unit of work producing one value from zero or more input values.
///
/// Serialized as `{"output": "c", "inputs": ["a", "b"]}`; a missing
/// `inputs` field means a source node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationNode {
    /// The value this node produces.
    output: ValueId,

    /// The values this node reads, in declared order.
    #[serde(default)]
    inputs: Inputs,
}

impl OperationNode {
    /// Create a node producing `output` from `inputs`.
    pub fn new<I, V>(output: impl Into<ValueId>, inputs: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ValueId>,
    {
        Self {
            output: output.into(),
            inputs: inputs.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a node with no inputs.
    pub fn source(output: impl Into<ValueId>) -> Self {
        Self {
            output: output.into(),
            inputs: Inputs::new(),
        }
    }

    /// Get the produced value.
    pub fn output(&self) -> &ValueId {
        &self.output
    }

    /// Get the consumed values in declared order.
    pub fn inputs(&self) -> &[ValueId] {
        &self.inputs
    }

    /// Check if the node reads nothing.
    pub fn is_source(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Number of distinct values this node reads.
    ///
    /// A value listed twice still occupies a single buffer.
    pub fn distinct_input_count(&self) -> usize {
        self.inputs
            .iter()
            .enumerate()
            .filter(|(i, input)| !self.inputs[..*i].contains(input))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_node_has_no_inputs() {
        let node = OperationNode::source("a");
        assert!(node.is_source());
        assert_eq!(node.output().as_str(), "a");
    }

    #[test]
    fn inputs_keep_declared_order() {
        let node = OperationNode::new("e", ["c", "a", "b"]);
        let names: Vec<_> = node.inputs().iter().map(ValueId::as_str).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn repeated_inputs_count_once() {
        let node = OperationNode::new("sq", ["x", "x", "y"]);
        assert_eq!(node.inputs().len(), 3);
        assert_eq!(node.distinct_input_count(), 2);
    }

    #[test]
    fn missing_inputs_field_decodes_as_source() {
        let node: OperationNode = serde_json::from_str(r#"{"output": "a"}"#).unwrap();
        assert!(node.is_source());

        let node: OperationNode =
            serde_json::from_str(r#"{"output": "c", "inputs": ["a", "b"]}"#).unwrap();
        assert_eq!(node, OperationNode::new("c", ["a", "b"]));
    }
}
