//! Engine tuning configuration
//!
//! Thresholds and caps are tunables, not contracts. Category requirements
//! given here override the built-in defaults one category at a time.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::domain::assessment::{CategoryRequirement, CompletenessConfig, SelectorConfig};
use crate::domain::knowledge::QuestionCategory;

use super::error::ValidationError;

/// Assessment engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Completeness score (0-100) that ends the dialogue with a diagnosis
    #[serde(default = "default_threshold")]
    pub completion_threshold: u8,

    /// Maximum answered questions before a diagnosis is forced
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,

    /// Leading conditions considered for discrimination and reporting
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Per-category overrides of the coverage requirements
    #[serde(default)]
    pub requirements: BTreeMap<QuestionCategory, CategoryRequirement>,
}

impl EngineConfig {
    pub fn selector_config(&self) -> SelectorConfig {
        SelectorConfig {
            top_k: self.top_k,
            ..SelectorConfig::default()
        }
    }

    pub fn completeness_config(&self) -> CompletenessConfig {
        let mut config = CompletenessConfig {
            threshold: self.completion_threshold,
            max_questions: self.max_questions,
            ..CompletenessConfig::default()
        };
        config.requirements.extend(self.requirements.clone());
        config
    }

    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.completion_threshold == 0 || self.completion_threshold > 100 {
            return Err(ValidationError::InvalidThreshold);
        }
        if self.max_questions == 0 {
            return Err(ValidationError::InvalidQuestionCap);
        }
        if self.top_k == 0 {
            return Err(ValidationError::InvalidTopK);
        }
        for (category, requirement) in &self.requirements {
            if !requirement.weight.is_finite() || requirement.weight < 0.0 {
                return Err(ValidationError::InvalidRequirementWeight(category.to_string()));
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            completion_threshold: default_threshold(),
            max_questions: default_max_questions(),
            top_k: default_top_k(),
            requirements: BTreeMap::new(),
        }
    }
}

fn default_threshold() -> u8 {
    80
}

fn default_max_questions() -> usize {
    25
}

fn default_top_k() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults_match_domain_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.completeness_config(), CompletenessConfig::default());
        assert_eq!(config.selector_config(), SelectorConfig::default());
    }

    #[test]
    fn test_requirement_override_keeps_other_defaults() {
        let mut config = EngineConfig::default();
        config
            .requirements
            .insert(QuestionCategory::Motor, CategoryRequirement::new(1, 1.0));

        let completeness = config.completeness_config();

        assert_eq!(
            completeness.requirements.get(&QuestionCategory::Motor),
            Some(&CategoryRequirement::new(1, 1.0))
        );
        assert_eq!(
            completeness.requirements.get(&QuestionCategory::Pain),
            CategoryRequirement::default_for(QuestionCategory::Pain).as_ref()
        );
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = EngineConfig {
            completion_threshold: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidThreshold));

        let config = EngineConfig {
            max_questions: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidQuestionCap));

        let config = EngineConfig {
            top_k: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTopK));
    }

    #[test]
    fn test_validation_rejects_negative_weight() {
        let mut config = EngineConfig::default();
        config
            .requirements
            .insert(QuestionCategory::Pain, CategoryRequirement::new(2, -1.0));
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidRequirementWeight(_))
        ));
    }

    #[test]
    fn test_deserialization_with_requirements() {
        let json = r#"{
            "completion_threshold": 70,
            "requirements": { "motor": { "required": 1, "weight": 0.5 } }
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.completion_threshold, 70);
        assert_eq!(config.max_questions, 25);
        assert_eq!(config.requirements.len(), 1);
    }
}
