//! Error Types
//!
//! Every failure the planner can report. All of them describe a problem with
//! the input graph or configuration; none are transient.

use thiserror::Error;

use crate::graph::ValueId;

/// Result type for graph and planning operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while building, ordering or planning a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GraphError {
    /// Two nodes declare the same output value.
    #[error("value '{output}' is produced by more than one node")]
    DuplicateOutput {
        /// The value declared twice.
        output: ValueId,
    },

    /// A node reads a value that no node produces.
    #[error("node '{node}' reads '{input}', which no node produces")]
    UnknownInput {
        /// The consuming node.
        node: ValueId,
        /// The dangling reference.
        input: ValueId,
    },

    /// The dependency graph contains a cycle.
    #[error("cycle detected in dependency graph: {path}")]
    CycleDetected {
        /// The cycle, rendered as `a -> b -> a`.
        path: String,
    },

    /// A node appears before one of its producers in a supplied order.
    #[error("node '{node}' is ordered before its input '{input}'")]
    OutOfOrder {
        /// The node that is scheduled too early.
        node: ValueId,
        /// The input that has not been produced yet.
        input: ValueId,
    },

    /// Configuration text could not be decoded.
    #[error("invalid planner configuration: {reason}")]
    InvalidConfig {
        /// Decoder message.
        reason: String,
    },
}

impl GraphError {
    /// Creates a duplicate output error
    pub fn duplicate_output(output: ValueId) -> Self {
        Self::DuplicateOutput { output }
    }

    /// Creates an unknown input error
    pub fn unknown_input(node: ValueId, input: ValueId) -> Self {
        Self::UnknownInput { node, input }
    }

    /// Creates a cycle error from the values along the cycle, first value repeated last.
    pub fn cycle<'a>(path: impl IntoIterator<Item = &'a ValueId>) -> Self {
        let path = path
            .into_iter()
            .map(ValueId::as_str)
            .collect::<Vec<_>>()
            .join(" -> ");
        Self::CycleDetected { path }
    }

    /// Creates an out-of-order error
    pub fn out_of_order(node: ValueId, input: ValueId) -> Self {
        Self::OutOfOrder { node, input }
    }

    /// Creates an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
