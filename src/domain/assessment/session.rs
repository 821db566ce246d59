//! AssessmentSession aggregate - one patient dialogue.
//!
//! The session is an explicit value passed into every engine call. Reads are
//! public; writes go through the conversation manager so the invariants
//! (answered ids match responses, urgency never decreases, terminated is
//! absorbing) hold.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{
    ConditionId, Percentage, QuestionId, SessionId, StateMachine, Timestamp,
};
use crate::domain::knowledge::{KnowledgeBase, QuestionCategory, QuestionTemplate, UrgencyLevel};

use super::answer::Answer;
use super::belief::{BeliefEngine, BeliefStatus, BeliefUpdate};
use super::errors::AssessmentError;
use super::finding::{derive_findings, ClinicalFindings, FindingValue};
use super::outcome::AssessmentOutcome;
use super::red_flag_monitor::DetectedRedFlag;
use super::state::AssessmentState;

/// A recorded answer together with its interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedResponse {
    pub answer: Answer,
    pub value: FindingValue,
    pub category: QuestionCategory,
    pub turn: u32,
    pub recorded_at: Timestamp,
}

/// Session aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSession {
    id: SessionId,
    state: AssessmentState,
    pending_question: Option<QuestionId>,
    answered_question_ids: Vec<QuestionId>,
    responses: BTreeMap<QuestionId, RecordedResponse>,
    findings: ClinicalFindings,
    posteriors: BTreeMap<ConditionId, f64>,
    belief_status: BeliefStatus,
    red_flags: Vec<DetectedRedFlag>,
    urgency: Option<UrgencyLevel>,
    completion: Percentage,
    missing_critical: Vec<QuestionCategory>,
    started_at: Timestamp,
    updated_at: Timestamp,
    turn: u32,
    outcome: Option<AssessmentOutcome>,
}

impl AssessmentSession {
    /// Creates a fresh session in `Init` with prior-only posteriors.
    pub fn new(kb: &KnowledgeBase) -> Self {
        Self::with_id(SessionId::new(), kb)
    }

    pub fn with_id(id: SessionId, kb: &KnowledgeBase) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            state: AssessmentState::Init,
            pending_question: None,
            answered_question_ids: Vec::new(),
            responses: BTreeMap::new(),
            findings: ClinicalFindings::default(),
            posteriors: BeliefEngine::prior_beliefs(kb),
            belief_status: BeliefStatus::InsufficientData,
            red_flags: Vec::new(),
            urgency: None,
            completion: Percentage::ZERO,
            missing_critical: Vec::new(),
            started_at: now,
            updated_at: now,
            turn: 0,
            outcome: None,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> AssessmentState {
        self.state
    }

    pub fn pending_question(&self) -> Option<&QuestionId> {
        self.pending_question.as_ref()
    }

    pub fn answered_question_ids(&self) -> &[QuestionId] {
        &self.answered_question_ids
    }

    pub fn responses(&self) -> &BTreeMap<QuestionId, RecordedResponse> {
        &self.responses
    }

    pub fn response(&self, question_id: &QuestionId) -> Option<&RecordedResponse> {
        self.responses.get(question_id)
    }

    pub fn findings(&self) -> &ClinicalFindings {
        &self.findings
    }

    pub fn posteriors(&self) -> &BTreeMap<ConditionId, f64> {
        &self.posteriors
    }

    pub fn posterior(&self, condition_id: &ConditionId) -> Option<f64> {
        self.posteriors.get(condition_id).copied()
    }

    pub fn belief_status(&self) -> BeliefStatus {
        self.belief_status
    }

    pub fn red_flags(&self) -> &[DetectedRedFlag] {
        &self.red_flags
    }

    pub fn urgency(&self) -> Option<UrgencyLevel> {
        self.urgency
    }

    pub fn completion(&self) -> Percentage {
        self.completion
    }

    pub fn missing_critical(&self) -> &[QuestionCategory] {
        &self.missing_critical
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn outcome(&self) -> Option<&AssessmentOutcome> {
        self.outcome.as_ref()
    }

    pub fn has_answered(&self, question_id: &QuestionId) -> bool {
        self.responses.contains_key(question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.answered_question_ids.len()
    }

    pub fn is_terminated(&self) -> bool {
        self.state.is_terminated()
    }

    // ───────────────────────────────────────────────────────────────
    // Mutators (conversation manager only)
    // ───────────────────────────────────────────────────────────────

    pub(super) fn transition(&mut self, target: AssessmentState) -> Result<(), AssessmentError> {
        self.state = self
            .state
            .transition_to(target)
            .map_err(|_| AssessmentError::InvalidState(self.state))?;
        self.touch();
        Ok(())
    }

    pub(super) fn set_pending(&mut self, question_id: Option<QuestionId>) {
        self.pending_question = question_id;
        self.touch();
    }

    /// Records the response and its findings. The caller has already
    /// checked that the question is pending and unanswered.
    pub(super) fn record_response(
        &mut self,
        template: &QuestionTemplate,
        answer: Answer,
        value: FindingValue,
    ) {
        self.turn += 1;
        for finding in derive_findings(template, &value) {
            self.findings.record(template.finding_category, finding);
        }
        self.answered_question_ids.push(template.id.clone());
        self.responses.insert(
            template.id.clone(),
            RecordedResponse {
                answer,
                value,
                category: template.category,
                turn: self.turn,
                recorded_at: Timestamp::now(),
            },
        );
        self.pending_question = None;
        self.touch();
    }

    pub(super) fn apply_beliefs(&mut self, update: BeliefUpdate) {
        self.posteriors = update.posteriors;
        self.belief_status = update.status;
    }

    pub(super) fn add_red_flags(&mut self, detected: Vec<DetectedRedFlag>, urgency: Option<UrgencyLevel>) {
        self.red_flags.extend(detected);
        self.urgency = self.urgency.max(urgency);
    }

    pub(super) fn set_completeness(&mut self, completion: Percentage, missing: Vec<QuestionCategory>) {
        self.completion = completion;
        self.missing_critical = missing;
    }

    pub(super) fn set_outcome(&mut self, outcome: AssessmentOutcome) {
        self.outcome = Some(outcome);
        self.pending_question = None;
        self.touch();
    }

    /// Clears everything but the id and returns to `Init`.
    pub(super) fn reset(&mut self, kb: &KnowledgeBase) {
        *self = Self::with_id(self.id, kb);
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
