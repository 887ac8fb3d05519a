//! Planner Configuration
//!
//! Knobs that select how the program order is derived. All fields default,
//! so `{}` is a complete configuration document.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// How the sorter treats dependency cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Fail with `CycleDetected`.
    #[default]
    Reject,

    /// Drop back-edges and omit components unreachable from any root.
    ///
    /// The resulting order may be incomplete or place a node before one of
    /// its inputs.
    Tolerate,
}

/// Where the program order comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStrategy {
    /// Depth-first topological sort from the graph's root values.
    #[default]
    Topological,

    /// Declaration order, validated but not reordered.
    Declared,
}

/// Configuration for a [`Planner`](crate::Planner).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub cycle_policy: CyclePolicy,
    pub order: OrderStrategy,
}

impl PlannerConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        serde_json::from_str(json).map_err(|e| GraphError::invalid_config(e.to_string()))
    }

    pub fn with_cycle_policy(mut self, cycle_policy: CyclePolicy) -> Self {
        self.cycle_policy = cycle_policy;
        self
    }

    pub fn with_order(mut self, order: OrderStrategy) -> Self {
        self.order = order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = PlannerConfig::from_json("{}").unwrap();
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.cycle_policy, CyclePolicy::Reject);
        assert_eq!(config.order, OrderStrategy::Topological);
    }

    #[test]
    fn parses_all_fields() {
        let config =
            PlannerConfig::from_json(r#"{"cycle_policy": "tolerate", "order": "declared"}"#)
                .unwrap();
        assert_eq!(config.cycle_policy, CyclePolicy::Tolerate);
        assert_eq!(config.order, OrderStrategy::Declared);
    }

    #[test]
    fn unknown_variant_is_invalid_config() {
        let err = PlannerConfig::from_json(r#"{"order": "random"}"#).unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfig { .. }));
    }
}
