//! Clinical condition reference data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{ConditionId, RedFlagId};

/// Likelihood weight used when a condition expresses no opinion on a finding.
pub const NEUTRAL_LIKELIHOOD: f64 = 1.0;

/// A condition in the differential, with its prior and evidence weights.
///
/// `likelihoods` maps evidence keys (see [`super::qualified_key`]) to how
/// strongly the finding supports this condition. Weights above 1.0 support
/// the condition, weights below 1.0 count against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: ConditionId,
    pub name: String,
    pub prior: f64,
    #[serde(default)]
    pub body_region: String,
    #[serde(default)]
    pub likelihoods: BTreeMap<String, f64>,
    #[serde(default)]
    pub red_flags: Vec<RedFlagId>,
}

impl Condition {
    /// Likelihood weight for an evidence key.
    ///
    /// Missing, negative or non-finite weights never fail: missing and
    /// non-finite fall back to neutral, negative clamps to zero.
    pub fn likelihood(&self, key: &str) -> f64 {
        match self.likelihoods.get(key) {
            Some(weight) if weight.is_finite() => weight.max(0.0),
            _ => NEUTRAL_LIKELIHOOD,
        }
    }

    /// Evidence keys among `present` that raise this condition's score.
    pub fn supporting<'a>(&self, present: impl IntoIterator<Item = &'a String>) -> Vec<String> {
        present
            .into_iter()
            .filter(|key| self.likelihood(key) > NEUTRAL_LIKELIHOOD)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition() -> Condition {
        Condition {
            id: ConditionId::new("lumbar_strain").unwrap(),
            name: "Lumbar strain".to_string(),
            prior: 0.3,
            body_region: "lumbar".to_string(),
            likelihoods: BTreeMap::from([
                ("pain_night".to_string(), 0.4),
                ("lifting_onset".to_string(), 2.5),
                ("bogus".to_string(), -3.0),
                ("broken".to_string(), f64::NAN),
            ]),
            red_flags: vec![],
        }
    }

    #[test]
    fn missing_key_is_neutral() {
        assert_eq!(condition().likelihood("radiating_pain"), NEUTRAL_LIKELIHOOD);
    }

    #[test]
    fn negative_weight_clamps_to_zero() {
        assert_eq!(condition().likelihood("bogus"), 0.0);
    }

    #[test]
    fn non_finite_weight_is_neutral() {
        assert_eq!(condition().likelihood("broken"), NEUTRAL_LIKELIHOOD);
    }

    #[test]
    fn supporting_keeps_only_weights_above_neutral() {
        let present = vec!["pain_night".to_string(), "lifting_onset".to_string()];
        assert_eq!(condition().supporting(&present), vec!["lifting_onset".to_string()]);
    }

    #[test]
    fn deserializes_with_defaults() {
        let yaml = "id: knee_oa\nname: Knee osteoarthritis\nprior: 0.2\n";
        let condition: Condition = serde_yaml::from_str(yaml).unwrap();
        assert!(condition.likelihoods.is_empty());
        assert!(condition.red_flags.is_empty());
        assert_eq!(condition.body_region, "");
    }
}
