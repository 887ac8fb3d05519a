//! Bufplan Core
//!
//! This crate computes minimal-width buffer allocations for dataflow graphs.
//! Each graph node produces one named value from zero or more earlier values;
//! the planner assigns every value to a reusable storage slot so that no two
//! values alive at the same time share a slot.
//!
//! It implements:
//!
//! - Graph validation (duplicate producers, dangling inputs)
//! - Topological ordering with cycle detection
//! - Liveness analysis (last use of every value)
//! - Greedy slot allocation with most-recently-freed reuse
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: Graph model, program order and the topological sorter
//! - `alloc`: Liveness analysis and the buffer allocator
//! - `config`: Planner configuration
//! - `planner`: The end-to-end pipeline
//!
//! Every pass is a pure function of its input. Planning the same graph twice
//! yields identical orders and bindings.
//!
//! # Example
//!
//! ```rust
//! use bufplan_core::{plan_graph, OperationNode};
//!
//! let plan = plan_graph([
//!     OperationNode::source("a"),
//!     OperationNode::source("b"),
//!     OperationNode::new("c", ["a", "b"]),
//!     OperationNode::new("d", ["c"]),
//! ])?;
//!
//! // `d` reuses the slot of `b`, which is dead once `c` is computed.
//! assert_eq!(plan.allocation.binding("d"), plan.allocation.binding("b"));
//! assert_eq!(plan.slots_used(), 3);
//! # Ok::<(), bufplan_core::GraphError>(())
//! ```

pub mod alloc;
pub mod config;
pub mod error;
pub mod graph;
pub mod planner;

pub use alloc::{
    Allocation, AllocationRecord, BufferAllocator, BufferSlot, Lifetime, LivenessAnalyzer,
    LivenessMap,
};
pub use config::{CyclePolicy, OrderStrategy, PlannerConfig};
pub use error::{GraphError, GraphResult};
pub use graph::{GraphModel, OperationNode, ProgramOrder, TopologicalSorter, ValueId};
pub use planner::{plan_graph, BufferPlan, Planner};
