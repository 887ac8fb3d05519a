//! Planner
//!
//! Runs the full pipeline: ordering, liveness analysis, then allocation.

use serde::{Deserialize, Serialize};

use crate::alloc::{Allocation, BufferAllocator, LivenessAnalyzer};
use crate::config::{OrderStrategy, PlannerConfig};
use crate::error::GraphResult;
use crate::graph::{GraphModel, OperationNode, ProgramOrder, TopologicalSorter};

/// Everything the pipeline derives from a graph.
///
/// The order and the allocation are computed together and never updated
/// independently; a changed graph needs a new plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferPlan {
    pub order: ProgramOrder,
    pub allocation: Allocation,
}

impl BufferPlan {
    /// Number of distinct slots the plan uses.
    pub fn slots_used(&self) -> usize {
        self.allocation.slots_used()
    }
}

/// Turns graph models into buffer plans.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan buffers for `graph`.
    ///
    /// Fails with `CycleDetected` when sorting rejects a cycle, or with
    /// `OutOfOrder` when the declaration order is requested but invalid.
    pub fn plan(&self, graph: &GraphModel) -> GraphResult<BufferPlan> {
        tracing::info!(nodes = graph.len(), order = ?self.config.order, "planning buffers");

        // Phase 1: program order
        let order = match self.config.order {
            OrderStrategy::Topological => {
                TopologicalSorter::new(self.config.cycle_policy).sort(graph)?
            }
            OrderStrategy::Declared => ProgramOrder::declared(graph)?,
        };
        tracing::info!(scheduled = order.len(), "program order ready");

        // Phase 2: liveness
        let lifetimes = LivenessAnalyzer::analyze(&order);

        // Phase 3: allocation
        let allocation = BufferAllocator::new().allocate_with(&order, lifetimes);
        tracing::info!(
            slots = allocation.slots_used(),
            min = allocation.min_buffer_count(),
            max = allocation.max_buffer_count(),
            "buffer plan complete"
        );

        Ok(BufferPlan { order, allocation })
    }
}

/// Build a graph from node descriptors and plan it with the default configuration.
pub fn plan_graph(nodes: impl IntoIterator<Item = OperationNode>) -> GraphResult<BufferPlan> {
    let graph = GraphModel::new(nodes)?;
    Planner::default().plan(&graph)
}
