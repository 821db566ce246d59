//! Decision-tree fragments linking finding combinations to conditions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{ConditionId, RuleId};

/// When every required evidence key is present, the target condition's
/// score is multiplied by `weight`.
///
/// Rules capture combinations whose joint presence is more telling than the
/// independent per-finding weights suggest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRule {
    pub id: RuleId,
    pub condition_id: ConditionId,
    pub requires: Vec<String>,
    pub weight: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl DecisionRule {
    /// Returns true if all required keys are present.
    pub fn is_satisfied(&self, evidence: &BTreeSet<String>) -> bool {
        !self.requires.is_empty() && self.requires.iter().all(|key| evidence.contains(key))
    }

    /// Weight applied when satisfied; negative and non-finite values are
    /// treated as neutral.
    pub fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() && self.weight >= 0.0 {
            self.weight
        } else {
            1.0
        }
    }
}
