//! The knowledge base: validated, read-only catalogs addressed by id.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

use crate::domain::foundation::{ConditionId, QuestionId, RedFlagId};

use super::condition::Condition;
use super::decision_rule::DecisionRule;
use super::question::{PromptType, QuestionTemplate};
use super::red_flag::{CompiledRedFlag, RedFlagPattern};

/// Errors raised while loading or validating a catalog.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("Catalog has no {0}")]
    Empty(&'static str),

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{referenced_by} references unknown {kind} '{id}'")]
    UnknownReference {
        kind: &'static str,
        id: String,
        referenced_by: String,
    },

    #[error("Condition '{condition}' has invalid prior {prior}")]
    InvalidPrior { condition: String, prior: f64 },

    #[error("Condition priors must not all be zero")]
    DegeneratePriors,

    #[error("Condition '{condition}' has invalid likelihood {weight} for '{key}'")]
    InvalidLikelihood {
        condition: String,
        key: String,
        weight: f64,
    },

    #[error("Question '{question}' is invalid: {reason}")]
    InvalidQuestion { question: String, reason: String },

    #[error("Red flag '{id}' is invalid: {reason}")]
    InvalidPattern { id: String, reason: String },

    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    #[error("Failed to read catalog: {0}")]
    Io(String),
}

/// Serialized form of a catalog, as authored in YAML or JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub conditions: Vec<Condition>,
    pub questions: Vec<QuestionTemplate>,
    #[serde(default)]
    pub red_flags: Vec<RedFlagPattern>,
    #[serde(default)]
    pub decision_rules: Vec<DecisionRule>,
}

/// Validated knowledge base consumed by the engine.
///
/// Conditions are held sorted by id so every iteration over them is
/// deterministic. Questions keep their authored order.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    conditions: Vec<Condition>,
    questions: Vec<QuestionTemplate>,
    red_flags: Vec<CompiledRedFlag>,
    decision_rules: Vec<DecisionRule>,
    condition_index: HashMap<ConditionId, usize>,
    question_index: HashMap<QuestionId, usize>,
    red_flag_index: HashMap<RedFlagId, usize>,
}

impl KnowledgeBase {
    /// Validates a catalog document and builds the knowledge base.
    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        let CatalogDocument {
            mut conditions,
            questions,
            red_flags,
            decision_rules,
        } = document;

        if conditions.is_empty() {
            return Err(CatalogError::Empty("conditions"));
        }
        if questions.is_empty() {
            return Err(CatalogError::Empty("questions"));
        }

        conditions.sort_by(|a, b| a.id.cmp(&b.id));
        let condition_index = index_unique("condition", conditions.iter().map(|c| &c.id))?;
        let question_index = index_unique("question", questions.iter().map(|q| &q.id))?;
        let red_flag_index = index_unique("red flag", red_flags.iter().map(|r| &r.id))?;

        validate_conditions(&conditions, &red_flag_index)?;
        for question in &questions {
            validate_question(question)?;
        }
        for rule in &decision_rules {
            if !condition_index.contains_key(&rule.condition_id) {
                return Err(CatalogError::UnknownReference {
                    kind: "condition",
                    id: rule.condition_id.to_string(),
                    referenced_by: format!("decision rule '{}'", rule.id),
                });
            }
        }

        let red_flags = red_flags
            .into_iter()
            .map(CompiledRedFlag::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let kb = Self {
            conditions,
            questions,
            red_flags,
            decision_rules,
            condition_index,
            question_index,
            red_flag_index,
        };
        kb.log_unreachable_keys();
        Ok(kb)
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn questions(&self) -> &[QuestionTemplate] {
        &self.questions
    }

    pub fn red_flags(&self) -> &[CompiledRedFlag] {
        &self.red_flags
    }

    pub fn decision_rules(&self) -> &[DecisionRule] {
        &self.decision_rules
    }

    pub fn condition(&self, id: &ConditionId) -> Option<&Condition> {
        self.condition_index.get(id).map(|&i| &self.conditions[i])
    }

    pub fn question(&self, id: &QuestionId) -> Option<&QuestionTemplate> {
        self.question_index.get(id).map(|&i| &self.questions[i])
    }

    pub fn red_flag(&self, id: &RedFlagId) -> Option<&CompiledRedFlag> {
        self.red_flag_index.get(id).map(|&i| &self.red_flags[i])
    }

    /// Priors normalized to sum to 1.
    pub fn normalized_priors(&self) -> BTreeMap<ConditionId, f64> {
        let total: f64 = self.conditions.iter().map(|c| c.prior).sum();
        self.conditions
            .iter()
            .map(|c| (c.id.clone(), c.prior / total))
            .collect()
    }

    /// Number of questions authored for a category.
    pub fn question_count(&self, category: super::QuestionCategory) -> usize {
        self.questions.iter().filter(|q| q.category == category).count()
    }

    /// Likelihood keys no question can ever produce are harmless (they stay
    /// neutral) but usually indicate a catalog typo.
    fn log_unreachable_keys(&self) {
        let producible: BTreeSet<String> = self
            .questions
            .iter()
            .flat_map(|q| q.candidate_evidence_keys())
            .collect();

        for condition in &self.conditions {
            for key in condition.likelihoods.keys() {
                if !producible.contains(key) {
                    tracing::debug!(
                        condition = %condition.id,
                        key = %key,
                        "Likelihood key is not produced by any question"
                    );
                }
            }
        }

        for question in self.questions.iter().filter(|q| q.red_flag) {
            let bound = question
                .finding_keys
                .iter()
                .any(|key| self.red_flags.iter().any(|r| r.matches_finding(key)));
            if question.prompt_type == PromptType::YesNo && !bound {
                tracing::warn!(
                    question = %question.id,
                    "Red-flag question has no finding-triggered pattern"
                );
            }
        }
    }
}

fn index_unique<'a, T>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a T>,
) -> Result<HashMap<T, usize>, CatalogError>
where
    T: Clone + Eq + std::hash::Hash + std::fmt::Display + 'a,
{
    let mut index = HashMap::new();
    for (position, id) in ids.enumerate() {
        if index.insert(id.clone(), position).is_some() {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(index)
}

fn validate_conditions(
    conditions: &[Condition],
    red_flag_index: &HashMap<RedFlagId, usize>,
) -> Result<(), CatalogError> {
    for condition in conditions {
        if !condition.prior.is_finite() || condition.prior < 0.0 {
            return Err(CatalogError::InvalidPrior {
                condition: condition.id.to_string(),
                prior: condition.prior,
            });
        }
        for (key, &weight) in &condition.likelihoods {
            if !weight.is_finite() || weight < 0.0 {
                return Err(CatalogError::InvalidLikelihood {
                    condition: condition.id.to_string(),
                    key: key.clone(),
                    weight,
                });
            }
        }
        for flag in &condition.red_flags {
            if !red_flag_index.contains_key(flag) {
                return Err(CatalogError::UnknownReference {
                    kind: "red flag",
                    id: flag.to_string(),
                    referenced_by: format!("condition '{}'", condition.id),
                });
            }
        }
    }

    if conditions.iter().map(|c| c.prior).sum::<f64>() <= 0.0 {
        return Err(CatalogError::DegeneratePriors);
    }
    Ok(())
}

fn validate_question(question: &QuestionTemplate) -> Result<(), CatalogError> {
    let invalid = |reason: &str| CatalogError::InvalidQuestion {
        question: question.id.to_string(),
        reason: reason.to_string(),
    };

    if question.prompt.trim().is_empty() {
        return Err(invalid("prompt is empty"));
    }
    if question.prompt_type.is_choice() && question.options.is_empty() {
        return Err(invalid("choice question has no options"));
    }
    if question.prompt_type != PromptType::FreeText && question.finding_keys.is_empty() {
        return Err(invalid("structured question has no finding keys"));
    }
    if !question.priority.is_finite() {
        return Err(invalid("priority is not finite"));
    }
    Ok(())
}
