//! Red-Flag Monitor - detects safety-critical findings in each answer.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{QuestionId, RedFlagId, Timestamp};
use crate::domain::knowledge::{
    CompiledRedFlag, KnowledgeBase, PromptType, QuestionCategory, QuestionTemplate, UrgencyLevel,
};

use super::finding::FindingValue;

/// A red flag that fired during the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedRedFlag {
    pub id: RedFlagId,
    pub name: String,
    pub urgency: UrgencyLevel,
    pub category: QuestionCategory,
    pub source_question: QuestionId,
    pub message: String,
    pub detected_at: Timestamp,
}

impl DetectedRedFlag {
    fn from_pattern(flag: &CompiledRedFlag, source: &QuestionId) -> Self {
        let pattern = flag.pattern();
        Self {
            id: pattern.id.clone(),
            name: pattern.name.clone(),
            urgency: pattern.urgency,
            category: pattern.category,
            source_question: source.clone(),
            message: pattern.referral_message(),
            detected_at: Timestamp::now(),
        }
    }
}

/// Stateless matcher over the catalog's red-flag patterns.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedFlagMonitor;

impl RedFlagMonitor {
    /// Patterns triggered by one interpreted answer, excluding any already
    /// detected earlier in the session.
    ///
    /// Free text (including the raw text of unparseable answers) is matched
    /// against keyword and regex triggers. A "yes" to a red-flag question
    /// fires the finding triggers bound to that question's finding keys.
    pub fn scan(
        kb: &KnowledgeBase,
        question: &QuestionTemplate,
        value: &FindingValue,
        already_detected: &[DetectedRedFlag],
    ) -> Vec<DetectedRedFlag> {
        let text = value.scannable_text();
        let affirmed = question.red_flag
            && question.prompt_type == PromptType::YesNo
            && matches!(value, FindingValue::Flag(true));

        let detected: Vec<DetectedRedFlag> = kb
            .red_flags()
            .iter()
            .filter(|flag| !already_detected.iter().any(|d| &d.id == flag.id()))
            .filter(|flag| {
                let by_text = text.is_some_and(|t| flag.matches_text(t));
                let by_finding = affirmed
                    && question
                        .finding_keys
                        .iter()
                        .any(|key| flag.matches_finding(key));
                by_text || by_finding
            })
            .map(|flag| DetectedRedFlag::from_pattern(flag, &question.id))
            .collect();

        for flag in &detected {
            tracing::warn!(
                red_flag = %flag.id,
                urgency = %flag.urgency,
                question = %question.id,
                "Red flag detected"
            );
        }
        detected
    }

    /// Running maximum of urgency. Never decreases.
    pub fn aggregate_urgency(
        current: Option<UrgencyLevel>,
        detected: &[DetectedRedFlag],
    ) -> Option<UrgencyLevel> {
        detected
            .iter()
            .map(|flag| flag.urgency)
            .chain(current)
            .max()
    }

    /// Returns true if the aggregate urgency demands referral.
    pub fn requires_referral(urgency: Option<UrgencyLevel>) -> bool {
        urgency.is_some_and(|u| u.requires_referral())
    }
}
