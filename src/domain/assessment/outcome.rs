//! Terminal outcomes and read-only diagnostic views.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::foundation::{ConditionId, Percentage, SessionId, Timestamp};
use crate::domain::knowledge::{KnowledgeBase, QuestionCategory, UrgencyLevel};

use super::belief::{BeliefEngine, BeliefStatus};
use super::red_flag_monitor::DetectedRedFlag;
use super::state::AssessmentState;

/// One entry of the ranked differential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCondition {
    pub condition_id: ConditionId,
    pub name: String,
    pub posterior: f64,
    /// Evidence keys that raised this condition's score.
    pub supporting_findings: Vec<String>,
}

/// Ranks every condition and attaches its supporting evidence.
pub fn rank_conditions(
    kb: &KnowledgeBase,
    posteriors: &BTreeMap<ConditionId, f64>,
    evidence: &BTreeSet<String>,
) -> Vec<RankedCondition> {
    BeliefEngine::rank(posteriors)
        .into_iter()
        .filter_map(|(id, posterior)| {
            let condition = kb.condition(&id)?;
            Some(RankedCondition {
                condition_id: id,
                name: condition.name.clone(),
                posterior,
                supporting_findings: condition.supporting(evidence),
            })
        })
        .collect()
}

/// How much to trust the leading condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    InsufficientData,
    Low,
    Moderate,
    High,
}

impl ConfidenceLevel {
    /// Derives confidence from the belief status and the top posterior.
    pub fn assess(status: BeliefStatus, top_posterior: Option<f64>) -> Self {
        match (status, top_posterior) {
            (BeliefStatus::InsufficientData, _) | (_, None) => ConfidenceLevel::InsufficientData,
            (BeliefStatus::LowConfidence, _) => ConfidenceLevel::Low,
            (BeliefStatus::Updated, Some(p)) if p < 0.5 => ConfidenceLevel::Low,
            (BeliefStatus::Updated, Some(p)) if p < 0.75 => ConfidenceLevel::Moderate,
            (BeliefStatus::Updated, Some(_)) => ConfidenceLevel::High,
        }
    }
}

/// Why a diagnosis was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisTrigger {
    CompletenessThreshold,
    QuestionCap,
    QuestionsExhausted,
}

/// Immutable snapshot of a ranked diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub ranked: Vec<RankedCondition>,
    pub completion: Percentage,
    pub confidence: ConfidenceLevel,
    pub trigger: DiagnosisTrigger,
    pub missing_critical: Vec<QuestionCategory>,
    pub generated_at: Timestamp,
}

impl DiagnosisResult {
    pub fn leading(&self) -> Option<&RankedCondition> {
        self.ranked.first()
    }
}

/// Immutable snapshot of an urgent referral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralResult {
    pub urgency: UrgencyLevel,
    pub triggers: Vec<DetectedRedFlag>,
    pub message: String,
    /// Differential at the moment of referral, for the receiving clinician.
    pub differential: Vec<RankedCondition>,
    pub generated_at: Timestamp,
}

impl ReferralResult {
    /// Builds a referral whose message lists every referral-grade trigger.
    pub fn new(
        urgency: UrgencyLevel,
        triggers: Vec<DetectedRedFlag>,
        differential: Vec<RankedCondition>,
    ) -> Self {
        let reasons: Vec<&str> = triggers
            .iter()
            .filter(|flag| flag.urgency.requires_referral())
            .map(|flag| flag.message.as_str())
            .collect();
        let message = format!("{} referral required: {}", urgency, reasons.join("; "));
        Self {
            urgency,
            triggers,
            message,
            differential,
            generated_at: Timestamp::now(),
        }
    }
}

/// Terminal outcome of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssessmentOutcome {
    Diagnosis(DiagnosisResult),
    Referral(ReferralResult),
}

/// Read-only view of a session's diagnostic picture.
///
/// Timestamps are copied from the session, never taken at read time, so
/// repeated reads of an unchanged session compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsSnapshot {
    pub session_id: SessionId,
    pub state: AssessmentState,
    pub top_conditions: Vec<RankedCondition>,
    pub confidence: ConfidenceLevel,
    pub completion_percentage: Percentage,
    pub urgency: Option<UrgencyLevel>,
    pub red_flags: Vec<DetectedRedFlag>,
    pub missing_critical: Vec<QuestionCategory>,
    pub answered_count: usize,
    pub started_at: Timestamp,
    pub updated_at: Timestamp,
}
