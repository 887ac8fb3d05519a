//! Buffer Allocation
//!
//! Liveness analysis and greedy slot assignment over a program order.
//!
//! # Overview
//!
//! Positions in the program order act as time. A value is live from the
//! position that produces it through the last position that reads it:
//!
//! - `LivenessAnalyzer` finds the last read of every value
//! - `BufferAllocator` walks the order once and binds each value to a slot
//!   that no live value holds, preferring the most recently vacated one
//!
//! This is interval-based register allocation. It is greedy, not optimal:
//! the slot count lands between the reported lower and upper bounds but is
//! not guaranteed to hit the lower one.

mod allocator;
mod liveness;

pub use allocator::{buffer_bounds, Allocation, AllocationRecord, BufferAllocator, BufferSlot};
pub use liveness::{Lifetime, LivenessAnalyzer, LivenessMap};
