//! Configuration for the visibility filter controller.

use serde::{Deserialize, Serialize};

use crate::filter::VisibilityRule;

/// Configuration for [`VisibilityFilterController`](super::VisibilityFilterController).
///
/// Deserializable so hosts can pass it through the same bridge as filter
/// data; missing fields fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityControllerConfig {
    /// How scales are compared against filter bounds.
    pub rule: VisibilityRule,

    /// Drop registry entries whose graphic has been released during a full
    /// recompute.
    pub prune_released: bool,
}

impl Default for VisibilityControllerConfig {
    fn default() -> Self {
        Self {
            rule: VisibilityRule::default(),
            prune_released: true,
        }
    }
}

impl VisibilityControllerConfig {
    /// Set the scale comparison rule.
    pub fn with_rule(mut self, rule: VisibilityRule) -> Self {
        self.rule = rule;
        self
    }

    /// Enable or disable pruning of released graphics.
    pub fn with_prune_released(mut self, prune: bool) -> Self {
        self.prune_released = prune;
        self
    }
}
