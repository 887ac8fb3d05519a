//! Buffer Allocator
//!
//! Assigns every produced value to a reusable buffer slot so that no two
//! values live at the same time share a slot.
//!
//! # Algorithm
//!
//! A single left-to-right pass over the program order. At position `i`:
//!
//! 1. Slots whose current occupant was last read before `i` are reusable
//! 2. Among those, take the one whose occupant was created most recently
//! 3. With no reusable slot, open a new one
//! 4. Record the binding; the new value now occupies the slot
//!
//! Values that are never read have an unbounded lifetime, so their slots are
//! pinned for the rest of the pass.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::liveness::{Lifetime, LivenessAnalyzer, LivenessMap};
use crate::graph::{OperationNode, ProgramOrder, ValueId};

/// Index of an interchangeable storage location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BufferSlot(usize);

impl BufferSlot {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for BufferSlot {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for BufferSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where one value lives and for how long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRecord {
    pub output: ValueId,
    pub binding: BufferSlot,
    /// Position of the producing node in the program order.
    pub creation_index: usize,
    pub lifetime: Lifetime,
}

impl AllocationRecord {
    /// Last position at which the value occupies its slot.
    ///
    /// A value is live at its own creation even if its recorded last use is
    /// earlier, which only happens for orders built with tolerated cycles.
    pub fn live_until(&self) -> Lifetime {
        self.lifetime.max(Lifetime::Bounded(self.creation_index))
    }

    /// Check if both values are live at some common position.
    pub fn overlaps(&self, other: &AllocationRecord) -> bool {
        Lifetime::Bounded(self.creation_index) <= other.live_until()
            && Lifetime::Bounded(other.creation_index) <= self.live_until()
    }
}

/// The result of one allocation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    allocations: IndexMap<ValueId, AllocationRecord>,
    lifetimes: LivenessMap,
    min_buffer_count: usize,
    max_buffer_count: usize,
}

impl Allocation {
    /// Get the record for `value`.
    pub fn get(&self, value: &str) -> Option<&AllocationRecord> {
        self.allocations.get(value)
    }

    /// Get the slot assigned to `value`.
    pub fn binding(&self, value: &str) -> Option<BufferSlot> {
        self.get(value).map(|record| record.binding)
    }

    /// Iterate over records in program order.
    pub fn records(&self) -> impl Iterator<Item = &AllocationRecord> {
        self.allocations.values()
    }

    /// Get the liveness map the pass ran with.
    pub fn lifetimes(&self) -> &LivenessMap {
        &self.lifetimes
    }

    /// Lower bound on slots: the widest node's distinct inputs plus its output.
    pub fn min_buffer_count(&self) -> usize {
        self.min_buffer_count
    }

    /// Trivial upper bound on slots.
    pub fn max_buffer_count(&self) -> usize {
        self.max_buffer_count
    }

    /// Number of distinct slots actually used.
    pub fn slots_used(&self) -> usize {
        self.records()
            .map(|record| record.binding)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Every pair of records that share a slot while both are live.
    ///
    /// Always empty for the allocator's own output.
    pub fn conflicts(&self) -> Vec<(&AllocationRecord, &AllocationRecord)> {
        let records: Vec<_> = self.records().collect();
        let mut conflicts = Vec::new();
        for (i, a) in records.iter().enumerate() {
            for b in &records[i + 1..] {
                if a.binding == b.binding && a.overlaps(b) {
                    conflicts.push((*a, *b));
                }
            }
        }
        conflicts
    }

    pub fn len(&self) -> usize {
        self.allocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }
}

/// Compute `(min_buffer_count, max_buffer_count)` for an order.
///
/// The lower bound counts each node's distinct inputs rather than the raw
/// input list, so a node reading one value twice is charged one slot for it.
pub fn buffer_bounds(order: &ProgramOrder) -> (usize, usize) {
    let widest = order
        .iter()
        .map(OperationNode::distinct_input_count)
        .max()
        .unwrap_or(0);
    let min = widest + 1;
    (min, order.len() + min - 1)
}

/// Value currently held by a slot.
#[derive(Debug, Clone, Copy)]
struct Occupant {
    creation_index: usize,
    lifetime: Lifetime,
}

/// Outcome of claiming a slot.
#[derive(Debug, Clone, Copy)]
struct Claim {
    slot: BufferSlot,
    reused: bool,
    candidates: usize,
}

/// Slot occupancy for a single allocation pass.
#[derive(Debug, Default)]
struct SlotTable {
    occupants: Vec<Occupant>,
}

impl SlotTable {
    /// Bind a value created at `position` to a slot, reusing the most
    /// recently filled free slot when there is one.
    fn claim(&mut self, position: usize, lifetime: Lifetime) -> Claim {
        let occupant = Occupant {
            creation_index: position,
            lifetime,
        };

        let mut candidates = 0;
        let mut best: Option<(usize, usize)> = None;
        for (index, current) in self.occupants.iter().enumerate() {
            if !current.lifetime.ends_before(position) {
                continue;
            }
            candidates += 1;
            if best.map_or(true, |(_, created)| current.creation_index > created) {
                best = Some((index, current.creation_index));
            }
        }

        match best {
            Some((index, _)) => {
                self.occupants[index] = occupant;
                Claim {
                    slot: BufferSlot(index),
                    reused: true,
                    candidates,
                }
            }
            None => {
                self.occupants.push(occupant);
                Claim {
                    slot: BufferSlot(self.occupants.len() - 1),
                    reused: false,
                    candidates,
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.occupants.len()
    }
}

/// Greedy slot allocator over a program order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferAllocator;

impl BufferAllocator {
    pub fn new() -> Self {
        Self
    }

    /// Run liveness analysis and allocate slots for `order`.
    pub fn allocate(&self, order: &ProgramOrder) -> Allocation {
        self.allocate_with(order, LivenessAnalyzer::analyze(order))
    }

    /// Allocate slots for `order` using precomputed liveness.
    ///
    /// The order is trusted; it is not re-validated.
    pub fn allocate_with(&self, order: &ProgramOrder, lifetimes: LivenessMap) -> Allocation {
        let (min_buffer_count, max_buffer_count) = buffer_bounds(order);
        let mut slots = SlotTable::default();
        let mut allocations = IndexMap::with_capacity(order.len());

        for (position, node) in order.iter().enumerate() {
            let output = node.output();
            let lifetime = lifetimes.lifetime(output.as_str());
            let claim = slots.claim(position, lifetime);

            tracing::trace!(
                position,
                value = %output,
                slot = claim.slot.index(),
                reused = claim.reused,
                candidates = claim.candidates,
                "bound value"
            );

            allocations.insert(
                output.clone(),
                AllocationRecord {
                    output: output.clone(),
                    binding: claim.slot,
                    creation_index: position,
                    lifetime,
                },
            );
        }

        tracing::debug!(
            slots = slots.len(),
            min_buffer_count,
            max_buffer_count,
            "allocation complete"
        );

        Allocation {
            allocations,
            lifetimes,
            min_buffer_count,
            max_buffer_count,
        }
    }
}
