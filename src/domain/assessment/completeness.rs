//! Completeness Evaluator - is the clinical picture complete enough?
//!
//! Scores weighted per-category coverage of answered questions. Only
//! parseable answers count towards coverage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::Percentage;
use crate::domain::knowledge::{KnowledgeBase, QuestionCategory};

use super::session::AssessmentSession;

/// Coverage required for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryRequirement {
    /// Parseable answers needed for full coverage.
    pub required: u32,
    /// Relative weight in the overall score.
    pub weight: f64,
}

impl CategoryRequirement {
    pub fn new(required: u32, weight: f64) -> Self {
        Self { required, weight }
    }

    /// Default requirement for a category. `None` means not required.
    pub fn default_for(category: QuestionCategory) -> Option<Self> {
        match category {
            QuestionCategory::RedFlagScreening => Some(Self::new(3, 3.0)),
            QuestionCategory::Pain => Some(Self::new(3, 3.0)),
            QuestionCategory::Neurological => Some(Self::new(2, 2.0)),
            QuestionCategory::Functional => Some(Self::new(2, 1.5)),
            QuestionCategory::History => Some(Self::new(1, 1.0)),
            QuestionCategory::RangeOfMotion | QuestionCategory::Motor => None,
        }
    }
}

/// Tunables for completeness evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessConfig {
    /// Score (0-100) at which the assessment is complete.
    pub threshold: u8,
    /// Answered-question cap; reaching it completes the assessment.
    pub max_questions: usize,
    pub requirements: BTreeMap<QuestionCategory, CategoryRequirement>,
}

impl Default for CompletenessConfig {
    fn default() -> Self {
        Self {
            threshold: 80,
            max_questions: 25,
            requirements: QuestionCategory::ALL
                .into_iter()
                .filter_map(|c| CategoryRequirement::default_for(c).map(|r| (c, r)))
                .collect(),
        }
    }
}

/// Result of a completeness evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub is_complete: bool,
    pub score: Percentage,
    /// Categories below requirement or holding an unparseable answer.
    pub missing_critical: Vec<QuestionCategory>,
    pub cap_reached: bool,
    /// Coverage fraction per required category.
    pub coverage: BTreeMap<QuestionCategory, f64>,
}

/// Stateless evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletenessEvaluator;

impl CompletenessEvaluator {
    pub fn evaluate(
        config: &CompletenessConfig,
        kb: &KnowledgeBase,
        session: &AssessmentSession,
    ) -> CompletenessReport {
        let mut parseable: BTreeMap<QuestionCategory, u32> = BTreeMap::new();
        let mut unparseable: Vec<QuestionCategory> = Vec::new();
        for response in session.responses().values() {
            if response.value.is_parseable() {
                *parseable.entry(response.category).or_default() += 1;
            } else if !unparseable.contains(&response.category) {
                unparseable.push(response.category);
            }
        }

        let mut coverage = BTreeMap::new();
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        let mut missing = Vec::new();

        for category in QuestionCategory::ALL {
            let Some(requirement) = config.requirements.get(&category) else {
                if unparseable.contains(&category) {
                    missing.push(category);
                }
                continue;
            };
            // A catalog cannot demand more answers than it has questions.
            let required = requirement.required.min(kb.question_count(category) as u32);
            if required == 0 || requirement.weight <= 0.0 || !requirement.weight.is_finite() {
                if unparseable.contains(&category) {
                    missing.push(category);
                }
                continue;
            }

            let answered = parseable.get(&category).copied().unwrap_or(0);
            let fraction = (f64::from(answered) / f64::from(required)).min(1.0);
            coverage.insert(category, fraction);
            weighted += requirement.weight * fraction;
            total_weight += requirement.weight;

            if fraction < 1.0 || unparseable.contains(&category) {
                missing.push(category);
            }
        }

        let score = if total_weight > 0.0 {
            Percentage::from_fraction(weighted / total_weight)
        } else {
            Percentage::HUNDRED
        };
        let cap_reached = session.answered_count() >= config.max_questions;

        CompletenessReport {
            is_complete: score.value() >= config.threshold || cap_reached,
            score,
            missing_critical: missing,
            cap_reached,
            coverage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assessment::{Answer, FindingValue};
    use crate::domain::foundation::{ConditionId, QuestionId};
    use crate::domain::knowledge::{
        CatalogDocument, Condition, FindingCategory, PromptType, QuestionTemplate,
    };

    fn question(id: &str, category: QuestionCategory) -> QuestionTemplate {
        QuestionTemplate {
            id: QuestionId::new(id).unwrap(),
            prompt: format!("{}?", id),
            category,
            prompt_type: PromptType::YesNo,
            options: vec![],
            finding_keys: vec![id.to_string()],
            finding_category: FindingCategory::Pain,
            topic: None,
            priority: 1.0,
            discriminative_hint: 0,
            red_flag: false,
        }
    }

    fn kb() -> KnowledgeBase {
        KnowledgeBase::from_document(CatalogDocument {
            conditions: vec![Condition {
                id: ConditionId::new("c1").unwrap(),
                name: "C1".to_string(),
                prior: 1.0,
                body_region: String::new(),
                likelihoods: BTreeMap::new(),
                red_flags: vec![],
            }],
            questions: vec![
                question("rf1", QuestionCategory::RedFlagScreening),
                question("rf2", QuestionCategory::RedFlagScreening),
                question("p1", QuestionCategory::Pain),
                question("p2", QuestionCategory::Pain),
                question("p3", QuestionCategory::Pain),
                question("n1", QuestionCategory::Neurological),
                question("n2", QuestionCategory::Neurological),
                question("f1", QuestionCategory::Functional),
                question("f2", QuestionCategory::Functional),
                question("h1", QuestionCategory::History),
                question("m1", QuestionCategory::Motor),
            ],
            red_flags: vec![],
            decision_rules: vec![],
        })
        .unwrap()
    }

    fn answer(kb: &KnowledgeBase, session: &mut AssessmentSession, id: &str, value: FindingValue) {
        let template = kb.question(&QuestionId::new(id).unwrap()).unwrap();
        session.record_response(template, Answer::text("x"), value);
    }

    #[test]
    fn empty_session_is_incomplete_and_lists_every_required_category() {
        let kb = kb();
        let session = AssessmentSession::new(&kb);
        let report = CompletenessEvaluator::evaluate(&CompletenessConfig::default(), &kb, &session);

        assert!(!report.is_complete);
        assert_eq!(report.score, Percentage::ZERO);
        assert_eq!(
            report.missing_critical,
            vec![
                QuestionCategory::RedFlagScreening,
                QuestionCategory::Pain,
                QuestionCategory::Neurological,
                QuestionCategory::Functional,
                QuestionCategory::History,
            ]
        );
    }

    #[test]
    fn requirement_is_capped_by_available_questions() {
        let kb = kb();
        let mut session = AssessmentSession::new(&kb);
        answer(&kb, &mut session, "rf1", FindingValue::Flag(false));
        answer(&kb, &mut session, "rf2", FindingValue::Flag(false));

        let report = CompletenessEvaluator::evaluate(&CompletenessConfig::default(), &kb, &session);
        assert_eq!(report.coverage[&QuestionCategory::RedFlagScreening], 1.0);
        assert!(!report.missing_critical.contains(&QuestionCategory::RedFlagScreening));
    }

    #[test]
    fn weighted_score_reaches_threshold() {
        let kb = kb();
        let mut session = AssessmentSession::new(&kb);
        for id in ["rf1", "rf2", "p1", "p2", "p3", "n1", "n2", "f1"] {
            answer(&kb, &mut session, id, FindingValue::Flag(true));
        }

        let report = CompletenessEvaluator::evaluate(&CompletenessConfig::default(), &kb, &session);
        // (3 + 3 + 2 + 0.75) / 10.5
        assert_eq!(report.score, Percentage::new(83));
        assert!(report.is_complete);
        assert!(!report.cap_reached);
        assert_eq!(
            report.missing_critical,
            vec![QuestionCategory::Functional, QuestionCategory::History]
        );
    }

    #[test]
    fn unparseable_answer_does_not_count_and_is_surfaced() {
        let kb = kb();
        let mut session = AssessmentSession::new(&kb);
        answer(&kb, &mut session, "h1", FindingValue::Unparseable {
            raw: "??".to_string(),
            reason: "expected yes or no".to_string(),
        });
        answer(&kb, &mut session, "m1", FindingValue::Unparseable {
            raw: "??".to_string(),
            reason: "expected yes or no".to_string(),
        });

        let report = CompletenessEvaluator::evaluate(&CompletenessConfig::default(), &kb, &session);
        assert_eq!(report.coverage[&QuestionCategory::History], 0.0);
        assert!(report.missing_critical.contains(&QuestionCategory::History));
        assert!(report.missing_critical.contains(&QuestionCategory::Motor));
    }

    #[test]
    fn question_cap_completes_regardless_of_score() {
        let kb = kb();
        let mut session = AssessmentSession::new(&kb);
        answer(&kb, &mut session, "m1", FindingValue::Flag(true));
        answer(&kb, &mut session, "h1", FindingValue::Flag(true));

        let config = CompletenessConfig {
            max_questions: 2,
            ..CompletenessConfig::default()
        };
        let report = CompletenessEvaluator::evaluate(&config, &kb, &session);
        assert!(report.cap_reached);
        assert!(report.is_complete);
        assert!(report.score.value() < config.threshold);
    }

    #[test]
    fn no_requirements_scores_full() {
        let kb = kb();
        let session = AssessmentSession::new(&kb);
        let config = CompletenessConfig {
            requirements: BTreeMap::new(),
            ..CompletenessConfig::default()
        };
        let report = CompletenessEvaluator::evaluate(&config, &kb, &session);
        assert_eq!(report.score, Percentage::HUNDRED);
        assert!(report.is_complete);
    }
}
