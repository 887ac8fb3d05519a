//! Liveness Analysis
//!
//! Computes, for every value read at least once, the last position in the
//! program order that reads it.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::graph::{ProgramOrder, ValueId};

/// The last position at which a value is read.
///
/// A value nobody reads is a graph output and stays live to the end of the
/// program. On the wire the two cases are a position and `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lifetime {
    /// Last read at this position.
    Bounded(usize),

    /// Never read; live forever.
    Unbounded,
}

impl Lifetime {
    /// Get the last-use position, or `None` for an unbounded lifetime.
    pub fn last_use(self) -> Option<usize> {
        match self {
            Self::Bounded(position) => Some(position),
            Self::Unbounded => None,
        }
    }

    /// Check if the value is fully consumed before `position`.
    pub fn ends_before(self, position: usize) -> bool {
        matches!(self, Self::Bounded(last) if last < position)
    }

    pub fn is_unbounded(self) -> bool {
        self == Self::Unbounded
    }
}

impl From<Option<usize>> for Lifetime {
    fn from(last_use: Option<usize>) -> Self {
        last_use.map_or(Self::Unbounded, Self::Bounded)
    }
}

impl Serialize for Lifetime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.last_use().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Lifetime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<usize>::deserialize(deserializer).map(Self::from)
    }
}

/// Last-use positions of every value read at least once.
///
/// Values never read are absent. Entries appear in order of first read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LivenessMap {
    last_use: IndexMap<ValueId, usize>,
}

impl LivenessMap {
    /// Get the recorded last-use position of `value`, if it is ever read.
    pub fn last_use(&self, value: &str) -> Option<usize> {
        self.last_use.get(value).copied()
    }

    /// Get the lifetime of `value`, unbounded if it is never read.
    pub fn lifetime(&self, value: &str) -> Lifetime {
        self.last_use(value).into()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ValueId, usize)> {
        self.last_use.iter().map(|(value, position)| (value, *position))
    }

    pub fn len(&self) -> usize {
        self.last_use.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_use.is_empty()
    }
}

/// Computes liveness over a program order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LivenessAnalyzer;

impl LivenessAnalyzer {
    /// Record the highest position at which each value is read. Runs in O(E).
    pub fn analyze(order: &ProgramOrder) -> LivenessMap {
        let mut last_use: IndexMap<ValueId, usize> = IndexMap::new();

        for (position, node) in order.iter().enumerate() {
            for input in node.inputs() {
                last_use
                    .entry(input.clone())
                    .and_modify(|last| *last = (*last).max(position))
                    .or_insert(position);
            }
        }

        tracing::debug!(
            consumed = last_use.len(),
            unbounded = order.len().saturating_sub(last_use.len()),
            "liveness computed"
        );
        LivenessMap { last_use }
    }
}
