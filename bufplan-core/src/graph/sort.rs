//! Topological Sorter
//!
//! Derives a program order from a graph model so that every value is produced
//! before it is read.
//!
//! # Algorithm
//!
//! We run a depth-first post-order walk starting from the root values:
//!
//! 1. Collect the roots: outputs never read by any node, in declaration order
//! 2. Visit each root. Visiting a value first visits each of its inputs in
//!    declared order, then emits the value
//! 3. A value that was already emitted is skipped, so shared dependencies
//!    (diamonds) are emitted once and never re-traversed
//! 4. Reaching a value that is still being visited means a back-edge, which
//!    the cycle policy either rejects or drops
//!
//! The walk uses an explicit stack instead of recursion, so long dependency
//! chains cannot overflow the call stack. It runs in O(V + E).

use std::collections::HashSet;

use super::model::GraphModel;
use super::node::{OperationNode, ValueId};
use super::order::ProgramOrder;
use crate::config::CyclePolicy;
use crate::error::{GraphError, GraphResult};

/// Visit state of a node during the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,

    /// On the current walk stack; reaching it again closes a cycle.
    InProgress,

    /// Emitted into the order.
    Done,
}

/// A node on the walk stack and the next input to visit.
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    next_input: usize,
}

/// Produces program orders from graph models.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologicalSorter {
    cycle_policy: CyclePolicy,
}

impl TopologicalSorter {
    /// Create a sorter with the given cycle policy.
    pub fn new(cycle_policy: CyclePolicy) -> Self {
        Self { cycle_policy }
    }

    /// Get the root values: outputs never read by any node, in declaration order.
    pub fn roots(graph: &GraphModel) -> Vec<&ValueId> {
        let referenced: HashSet<&ValueId> = graph
            .nodes()
            .flat_map(|node| node.inputs().iter())
            .collect();

        graph
            .nodes()
            .map(OperationNode::output)
            .filter(|output| !referenced.contains(output))
            .collect()
    }

    /// Sort the graph into a program order.
    ///
    /// Under `CyclePolicy::Reject` any cycle fails with `CycleDetected`, even
    /// one no root can reach. Under `CyclePolicy::Tolerate` such components
    /// are left out, so a graph with no roots sorts to an empty order.
    pub fn sort(&self, graph: &GraphModel) -> GraphResult<ProgramOrder> {
        let mut walk = Walk::new(graph, self.cycle_policy);

        let roots = Self::roots(graph);
        tracing::debug!(roots = roots.len(), nodes = graph.len(), "sorting from roots");

        for root in roots {
            if let Some(index) = graph.index_of(root.as_str()) {
                walk.visit(index)?;
            }
        }

        let unreached = graph.len() - walk.emitted.len();
        if unreached > 0 {
            match self.cycle_policy {
                // Every unreached node sits on or below a cycle, so one of
                // these walks is guaranteed to hit a back-edge.
                CyclePolicy::Reject => {
                    for index in 0..graph.len() {
                        walk.visit(index)?;
                    }
                }
                CyclePolicy::Tolerate => {
                    tracing::warn!(unreached, "omitting nodes unreachable from any root");
                }
            }
        }

        Ok(ProgramOrder::from_nodes_unchecked(
            walk.emitted.into_iter().cloned().collect(),
        ))
    }
}

/// Pass-local state of one sort.
struct Walk<'g> {
    graph: &'g GraphModel,
    cycle_policy: CyclePolicy,
    /// Nodes by declaration index.
    nodes: Vec<&'g OperationNode>,
    marks: Vec<Mark>,
    stack: Vec<Frame>,
    emitted: Vec<&'g OperationNode>,
}

impl<'g> Walk<'g> {
    fn new(graph: &'g GraphModel, cycle_policy: CyclePolicy) -> Self {
        Self {
            graph,
            cycle_policy,
            nodes: graph.nodes().collect(),
            marks: vec![Mark::Unvisited; graph.len()],
            stack: Vec::new(),
            emitted: Vec::with_capacity(graph.len()),
        }
    }

    /// Emit `start` and everything it depends on that has not been emitted yet.
    fn visit(&mut self, start: usize) -> GraphResult<()> {
        if self.marks[start] != Mark::Unvisited {
            return Ok(());
        }
        self.enter(start);

        while let Some(frame) = self.stack.last_mut() {
            let index = frame.node;
            let cursor = frame.next_input;
            frame.next_input += 1;

            let node = self.nodes[index];
            let Some(input) = node.inputs().get(cursor) else {
                self.marks[index] = Mark::Done;
                self.emitted.push(node);
                self.stack.pop();
                continue;
            };

            let Some(child) = self.graph.index_of(input.as_str()) else {
                continue;
            };
            match self.marks[child] {
                Mark::Unvisited => self.enter(child),
                Mark::InProgress => self.back_edge(node, child)?,
                Mark::Done => {}
            }
        }

        Ok(())
    }

    fn enter(&mut self, index: usize) {
        self.marks[index] = Mark::InProgress;
        self.stack.push(Frame {
            node: index,
            next_input: 0,
        });
    }

    fn back_edge(&self, from: &OperationNode, to: usize) -> GraphResult<()> {
        let target = self.nodes[to].output();
        match self.cycle_policy {
            CyclePolicy::Reject => {
                let start = self
                    .stack
                    .iter()
                    .position(|frame| frame.node == to)
                    .unwrap_or(0);
                let path = self.stack[start..]
                    .iter()
                    .map(|frame| self.nodes[frame.node].output())
                    .chain(std::iter::once(target));
                Err(GraphError::cycle(path))
            }
            CyclePolicy::Tolerate => {
                tracing::warn!(
                    node = %from.output(),
                    input = %target,
                    "dropping dependency edge that closes a cycle"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: &[(&str, &[&str])]) -> GraphModel {
        GraphModel::new(
            nodes
                .iter()
                .map(|(output, inputs)| OperationNode::new(*output, inputs.iter().copied())),
        )
        .unwrap()
    }

    fn names(order: &ProgramOrder) -> Vec<&str> {
        order.outputs().map(ValueId::as_str).collect()
    }

    #[test]
    fn roots_are_unread_outputs_in_declaration_order() {
        let g = graph(&[("a", &[]), ("x", &["a"]), ("b", &[]), ("y", &["b"])]);
        let roots: Vec<_> = TopologicalSorter::roots(&g)
            .into_iter()
            .map(ValueId::as_str)
            .collect();
        assert_eq!(roots, ["x", "y"]);
    }

    #[test]
    fn inputs_emitted_before_consumers() {
        let g = graph(&[("c", &["a", "b"]), ("b", &["a"]), ("a", &[])]);
        let order = TopologicalSorter::default().sort(&g).unwrap();
        assert_eq!(names(&order), ["a", "b", "c"]);
        assert!(order.validate().is_ok());
    }

    #[test]
    fn diamond_emits_shared_dependency_once() {
        let g = graph(&[
            ("top", &["left", "right"]),
            ("left", &["base"]),
            ("right", &["base"]),
            ("base", &[]),
        ]);
        let order = TopologicalSorter::default().sort(&g).unwrap();
        assert_eq!(names(&order), ["base", "left", "right", "top"]);
    }

    #[test]
    fn depth_first_from_roots() {
        let g = graph(&[
            ("a", &[]),
            ("b", &[]),
            ("c", &["a", "b"]),
            ("d", &["c", "b"]),
            ("e", &["c", "a", "b"]),
            ("f", &["e"]),
            ("g", &["f", "d"]),
            ("h", &["e"]),
        ]);
        let order = TopologicalSorter::default().sort(&g).unwrap();
        assert_eq!(names(&order), ["a", "b", "c", "e", "f", "d", "g", "h"]);
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let n = 100_000;
        let nodes = (0..n).map(|i| {
            if i == 0 {
                OperationNode::source("v0")
            } else {
                OperationNode::new(format!("v{i}"), [format!("v{}", i - 1)])
            }
        });
        let g = GraphModel::new(nodes).unwrap();
        let order = TopologicalSorter::default().sort(&g).unwrap();
        assert_eq!(order.len(), n);
        assert_eq!(order.get(0).unwrap().output().as_str(), "v0");
    }

    #[test]
    fn cycle_reachable_from_root_is_rejected() {
        let g = graph(&[("out", &["a"]), ("a", &["b"]), ("b", &["a"])]);
        let err = TopologicalSorter::default().sort(&g).unwrap_err();
        assert_eq!(
            err,
            GraphError::CycleDetected {
                path: "a -> b -> a".to_string()
            }
        );
    }

    #[test]
    fn rootless_cycle_is_rejected() {
        let g = graph(&[("a", &["b"]), ("b", &["a"])]);
        let err = TopologicalSorter::default().sort(&g).unwrap_err();
        assert!(matches!(err, GraphError::CycleDetected { .. }));
    }

    #[test]
    fn self_loop_is_rejected() {
        let g = graph(&[("a", &["a"])]);
        let err = TopologicalSorter::default().sort(&g).unwrap_err();
        assert_eq!(err.to_string(), "cycle detected in dependency graph: a -> a");
    }

    #[test]
    fn tolerated_cycle_drops_back_edge() {
        let g = graph(&[("out", &["a"]), ("a", &["b"]), ("b", &["a"])]);
        let order = TopologicalSorter::new(CyclePolicy::Tolerate).sort(&g).unwrap();
        assert_eq!(names(&order), ["b", "a", "out"]);
    }

    #[test]
    fn tolerated_rootless_graph_sorts_empty() {
        let g = graph(&[("a", &["b"]), ("b", &["a"])]);
        let order = TopologicalSorter::new(CyclePolicy::Tolerate).sort(&g).unwrap();
        assert!(order.is_empty());
    }

    #[test]
    fn empty_graph_sorts_empty() {
        let order = TopologicalSorter::default()
            .sort(&GraphModel::default())
            .unwrap();
        assert!(order.is_empty());
    }
}
