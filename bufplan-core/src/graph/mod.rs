//! Dataflow Graph
//!
//! This module holds the graph representation and the ordering pass.
//!
//! # Overview
//!
//! A graph is a set of operation nodes. Each node produces exactly one named
//! value and reads zero or more values produced by other nodes:
//!
//! - `GraphModel` validates that the set is closed (no dangling inputs) and
//!   free of duplicate producers
//! - `TopologicalSorter` turns the model into a `ProgramOrder`, a linear
//!   schedule in which producers always precede their consumers
//!
//! The model is immutable once built. Any change to the input graph means
//! building a new model and recomputing everything downstream.

mod model;
mod node;
mod order;
mod sort;

pub use model::GraphModel;
pub use node::{Inputs, OperationNode, ValueId};
pub use order::ProgramOrder;
pub use sort::TopologicalSorter;
