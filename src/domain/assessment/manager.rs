//! Conversation Manager - drives one assessment through its lifecycle.
//!
//! A turn has two phases so that an asynchronous advisor can sit between
//! them without making the domain async:
//!
//! 1. `record_answer` validates and records the answer, scans for red
//!    flags, updates beliefs and decides whether the dialogue ends
//! 2. `advance` picks the next question, optionally honouring an external
//!    recommendation, or ends the dialogue when nothing is left to ask
//!
//! `submit_answer` runs both phases with the local selector.

use crate::domain::foundation::{QuestionId, Timestamp};
use crate::domain::knowledge::{KnowledgeBase, QuestionTemplate, UrgencyLevel};

use super::answer::Answer;
use super::belief::BeliefEngine;
use super::completeness::{CompletenessConfig, CompletenessEvaluator, CompletenessReport};
use super::errors::AssessmentError;
use super::finding::interpret;
use super::outcome::{
    rank_conditions, AssessmentOutcome, ConfidenceLevel, DiagnosisResult, DiagnosisTrigger,
    DiagnosticsSnapshot, ReferralResult,
};
use super::question_selector::{QuestionSelector, SelectorConfig};
use super::red_flag_monitor::RedFlagMonitor;
use super::session::AssessmentSession;
use super::state::{AssessmentState, Termination};

/// Result of recording an answer.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnProgress {
    /// The dialogue goes on; call `advance` for the next question.
    Continue,
    Terminated(AssessmentOutcome),
}

/// What the caller should do after a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome<'a> {
    NextQuestion(&'a QuestionTemplate),
    Terminated(AssessmentOutcome),
}

/// Stateless driver; all per-dialogue state lives in the session.
#[derive(Debug, Clone, Default)]
pub struct ConversationManager {
    selector: QuestionSelector,
    completeness: CompletenessConfig,
}

impl ConversationManager {
    pub fn new(selector: SelectorConfig, completeness: CompletenessConfig) -> Self {
        Self {
            selector: QuestionSelector::new(selector),
            completeness,
        }
    }

    pub fn selector(&self) -> &QuestionSelector {
        &self.selector
    }

    pub fn completeness_config(&self) -> &CompletenessConfig {
        &self.completeness
    }

    /// Moves a fresh session from `Init` to its first question.
    pub fn start<'a>(
        &self,
        kb: &'a KnowledgeBase,
        session: &mut AssessmentSession,
    ) -> Result<&'a QuestionTemplate, AssessmentError> {
        if session.state() != AssessmentState::Init {
            return Err(AssessmentError::InvalidState(session.state()));
        }
        let question = self
            .selector
            .select_next(kb, session)
            .map(|selection| selection.question)
            .ok_or(AssessmentError::InvalidState(session.state()))?;

        session.transition(AssessmentState::AwaitingAnswer)?;
        session.set_pending(Some(question.id.clone()));

        tracing::info!(
            session_id = %session.id(),
            question = %question.id,
            "Assessment started"
        );
        Ok(question)
    }

    /// Validates and records an answer, then decides whether to terminate.
    ///
    /// Rejections leave the session untouched.
    pub fn record_answer(
        &self,
        kb: &KnowledgeBase,
        session: &mut AssessmentSession,
        question_id: &QuestionId,
        answer: Answer,
    ) -> Result<TurnProgress, AssessmentError> {
        let template = self.validate_submission(kb, session, question_id)?;

        let value = interpret(template, &answer);
        if !value.is_parseable() {
            tracing::debug!(
                session_id = %session.id(),
                question = %question_id,
                "Answer could not be interpreted"
            );
        }
        let detected = RedFlagMonitor::scan(kb, template, &value, session.red_flags());
        let urgency = RedFlagMonitor::aggregate_urgency(session.urgency(), &detected);

        session.record_response(template, answer, value);
        session.add_red_flags(detected, urgency);
        session.apply_beliefs(BeliefEngine::update_beliefs(kb, session.findings()));

        let report = CompletenessEvaluator::evaluate(&self.completeness, kb, session);
        session.set_completeness(report.score, report.missing_critical.clone());

        if let Some(urgency) = session.urgency().filter(UrgencyLevel::requires_referral) {
            return self.refer(kb, session, urgency).map(TurnProgress::Terminated);
        }
        if report.is_complete {
            let trigger = diagnosis_trigger(&report);
            return self.diagnose(kb, session, trigger).map(TurnProgress::Terminated);
        }
        Ok(TurnProgress::Continue)
    }

    /// Asks the next question after an answer was recorded.
    ///
    /// An unanswered red-flag question in an implicated category always
    /// wins. Otherwise a recommendation is used if it names a known,
    /// unanswered question, and the local selector decides if not.
    pub fn advance<'a>(
        &self,
        kb: &'a KnowledgeBase,
        session: &mut AssessmentSession,
        recommendation: Option<&QuestionId>,
    ) -> Result<TurnOutcome<'a>, AssessmentError> {
        if !session.state().accepts_answers() {
            return Err(AssessmentError::InvalidState(session.state()));
        }
        if let Some(urgency) = session.urgency().filter(UrgencyLevel::requires_referral) {
            return self.refer(kb, session, urgency).map(TurnOutcome::Terminated);
        }
        // Already advanced: the pending question stands.
        if let Some(pending) = session.pending_question().and_then(|id| kb.question(id)) {
            return Ok(TurnOutcome::NextQuestion(pending));
        }

        let recommended = recommendation.and_then(|id| match kb.question(id) {
            Some(question) if !session.has_answered(id) => Some(question),
            _ => {
                tracing::debug!(
                    session_id = %session.id(),
                    question = %id,
                    "Ignoring recommendation for unknown or answered question"
                );
                None
            }
        });

        let next = self
            .selector
            .safety_priority(kb, session)
            .or(recommended)
            .or_else(|| self.selector.select_next(kb, session).map(|s| s.question));

        match next {
            Some(question) => {
                session.transition(AssessmentState::AwaitingAnswer)?;
                session.set_pending(Some(question.id.clone()));
                Ok(TurnOutcome::NextQuestion(question))
            }
            None => self
                .diagnose(kb, session, DiagnosisTrigger::QuestionsExhausted)
                .map(TurnOutcome::Terminated),
        }
    }

    /// Records an answer and asks the next locally selected question.
    pub fn submit_answer<'a>(
        &self,
        kb: &'a KnowledgeBase,
        session: &mut AssessmentSession,
        question_id: &QuestionId,
        answer: Answer,
    ) -> Result<TurnOutcome<'a>, AssessmentError> {
        match self.record_answer(kb, session, question_id, answer)? {
            TurnProgress::Terminated(outcome) => Ok(TurnOutcome::Terminated(outcome)),
            TurnProgress::Continue => self.advance(kb, session, None),
        }
    }

    /// Clears the session in place, keeping its id.
    pub fn reset(&self, kb: &KnowledgeBase, session: &mut AssessmentSession) {
        session.reset(kb);
        tracing::info!(session_id = %session.id(), "Assessment reset");
    }

    /// Red-flag question that must be asked next, if any.
    pub fn safety_question<'a>(
        &self,
        kb: &'a KnowledgeBase,
        session: &AssessmentSession,
    ) -> Option<&'a QuestionTemplate> {
        self.selector.safety_priority(kb, session)
    }

    /// Read-only diagnostic view. Calling it twice on an unchanged session
    /// yields equal snapshots.
    pub fn diagnostics(&self, kb: &KnowledgeBase, session: &AssessmentSession) -> DiagnosticsSnapshot {
        let evidence = session.findings().evidence_keys();
        let mut ranked = rank_conditions(kb, session.posteriors(), &evidence);
        let confidence =
            ConfidenceLevel::assess(session.belief_status(), ranked.first().map(|r| r.posterior));
        ranked.truncate(self.selector.config().top_k);

        DiagnosticsSnapshot {
            session_id: session.id(),
            state: session.state(),
            top_conditions: ranked,
            confidence,
            completion_percentage: session.completion(),
            urgency: session.urgency(),
            red_flags: session.red_flags().to_vec(),
            missing_critical: session.missing_critical().to_vec(),
            answered_count: session.answered_count(),
            started_at: session.started_at(),
            updated_at: session.updated_at(),
        }
    }

    fn validate_submission<'a>(
        &self,
        kb: &'a KnowledgeBase,
        session: &AssessmentSession,
        question_id: &QuestionId,
    ) -> Result<&'a QuestionTemplate, AssessmentError> {
        let state = session.state();
        if !state.accepts_answers() {
            return Err(AssessmentError::InvalidState(state));
        }
        let template = kb
            .question(question_id)
            .ok_or_else(|| AssessmentError::UnknownQuestion(question_id.clone()))?;
        if session.has_answered(question_id) {
            return Err(AssessmentError::AlreadyAnswered(question_id.clone()));
        }
        if session.pending_question() != Some(question_id) {
            return Err(AssessmentError::QuestionNotPending {
                expected: session.pending_question().cloned(),
                received: question_id.clone(),
            });
        }
        Ok(template)
    }

    fn refer(
        &self,
        kb: &KnowledgeBase,
        session: &mut AssessmentSession,
        urgency: UrgencyLevel,
    ) -> Result<AssessmentOutcome, AssessmentError> {
        let evidence = session.findings().evidence_keys();
        let referral = ReferralResult::new(
            urgency,
            session.red_flags().to_vec(),
            rank_conditions(kb, session.posteriors(), &evidence),
        );
        session.transition(AssessmentState::Terminated(Termination::Referral))?;

        tracing::warn!(
            session_id = %session.id(),
            urgency = %urgency,
            triggers = referral.triggers.len(),
            "Assessment terminated with referral"
        );
        let outcome = AssessmentOutcome::Referral(referral);
        session.set_outcome(outcome.clone());
        Ok(outcome)
    }

    fn diagnose(
        &self,
        kb: &KnowledgeBase,
        session: &mut AssessmentSession,
        trigger: DiagnosisTrigger,
    ) -> Result<AssessmentOutcome, AssessmentError> {
        let evidence = session.findings().evidence_keys();
        let ranked = rank_conditions(kb, session.posteriors(), &evidence);
        let confidence =
            ConfidenceLevel::assess(session.belief_status(), ranked.first().map(|r| r.posterior));
        let diagnosis = DiagnosisResult {
            ranked,
            completion: session.completion(),
            confidence,
            trigger,
            missing_critical: session.missing_critical().to_vec(),
            generated_at: Timestamp::now(),
        };
        session.transition(AssessmentState::Terminated(Termination::Diagnosis))?;

        tracing::info!(
            session_id = %session.id(),
            trigger = ?trigger,
            completion = %session.completion(),
            leading = diagnosis.leading().map(|r| r.condition_id.as_str()).unwrap_or("none"),
            "Assessment terminated with diagnosis"
        );
        let outcome = AssessmentOutcome::Diagnosis(diagnosis);
        session.set_outcome(outcome.clone());
        Ok(outcome)
    }
}

fn diagnosis_trigger(report: &CompletenessReport) -> DiagnosisTrigger {
    if report.cap_reached {
        DiagnosisTrigger::QuestionCap
    } else {
        DiagnosisTrigger::CompletenessThreshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assessment::BeliefStatus;
    use crate::domain::foundation::{ConditionId, RedFlagId};
    use crate::domain::knowledge::{
        CatalogDocument, Condition, FindingCategory, PromptType, QuestionCategory, QuestionTopic,
        RedFlagPattern, RedFlagTrigger,
    };
    use std::collections::BTreeMap;

    fn qid(id: &str) -> QuestionId {
        QuestionId::new(id).unwrap()
    }

    fn question(
        id: &str,
        category: QuestionCategory,
        topic: QuestionTopic,
        prompt_type: PromptType,
        key: &str,
        red_flag: bool,
    ) -> QuestionTemplate {
        QuestionTemplate {
            id: qid(id),
            prompt: format!("{}?", id),
            category,
            prompt_type,
            options: vec![],
            finding_keys: if key.is_empty() { vec![] } else { vec![key.to_string()] },
            finding_category: FindingCategory::Pain,
            topic: Some(topic),
            priority: 1.0,
            discriminative_hint: 0,
            red_flag,
        }
    }

    fn kb() -> KnowledgeBase {
        KnowledgeBase::from_document(CatalogDocument {
            conditions: vec![
                Condition {
                    id: ConditionId::new("c1").unwrap(),
                    name: "C1".to_string(),
                    prior: 0.6,
                    body_region: String::new(),
                    likelihoods: BTreeMap::from([("pain_night".to_string(), 0.9)]),
                    red_flags: vec![],
                },
                Condition {
                    id: ConditionId::new("c2").unwrap(),
                    name: "C2".to_string(),
                    prior: 0.4,
                    body_region: String::new(),
                    likelihoods: BTreeMap::from([("pain_night".to_string(), 0.1)]),
                    red_flags: vec![],
                },
            ],
            questions: vec![
                question(
                    "bladder",
                    QuestionCategory::RedFlagScreening,
                    QuestionTopic::RedFlagScreening,
                    PromptType::YesNo,
                    "bladder_dysfunction",
                    true,
                ),
                question(
                    "night_pain",
                    QuestionCategory::Pain,
                    QuestionTopic::PainSeverity,
                    PromptType::YesNo,
                    "pain_night",
                    false,
                ),
                question(
                    "describe",
                    QuestionCategory::Pain,
                    QuestionTopic::PainLocation,
                    PromptType::FreeText,
                    "",
                    false,
                ),
                question(
                    "history",
                    QuestionCategory::History,
                    QuestionTopic::History,
                    PromptType::YesNo,
                    "prior_episode",
                    false,
                ),
            ],
            red_flags: vec![
                RedFlagPattern {
                    id: RedFlagId::new("cauda_equina").unwrap(),
                    name: "Bladder dysfunction".to_string(),
                    category: QuestionCategory::RedFlagScreening,
                    trigger: RedFlagTrigger::Finding {
                        finding_key: "bladder_dysfunction".to_string(),
                    },
                    urgency: UrgencyLevel::Urgent,
                    message: Some("Possible cauda equina syndrome".to_string()),
                },
                RedFlagPattern {
                    id: RedFlagId::new("numbness").unwrap(),
                    name: "Numbness".to_string(),
                    category: QuestionCategory::Neurological,
                    trigger: RedFlagTrigger::Keywords {
                        keywords: vec!["numbness".to_string()],
                    },
                    urgency: UrgencyLevel::Moderate,
                    message: None,
                },
            ],
            decision_rules: vec![],
        })
        .unwrap()
    }

    fn manager() -> ConversationManager {
        ConversationManager::default()
    }

    fn started(kb: &KnowledgeBase) -> AssessmentSession {
        let mut session = AssessmentSession::new(kb);
        manager().start(kb, &mut session).unwrap();
        session
    }

    mod start {
        use super::*;

        #[test]
        fn asks_first_question_in_topic_order() {
            let kb = kb();
            let mut session = AssessmentSession::new(&kb);
            let first = manager().start(&kb, &mut session).unwrap();

            assert_eq!(first.id, qid("bladder"));
            assert_eq!(session.state(), AssessmentState::AwaitingAnswer);
            assert_eq!(session.pending_question(), Some(&qid("bladder")));
        }

        #[test]
        fn cannot_start_twice() {
            let kb = kb();
            let mut session = started(&kb);
            assert_eq!(
                manager().start(&kb, &mut session),
                Err(AssessmentError::InvalidState(AssessmentState::AwaitingAnswer))
            );
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn unknown_question_is_rejected_without_change() {
            let kb = kb();
            let mut session = started(&kb);
            let before = session.clone();

            let result = manager().submit_answer(&kb, &mut session, &qid("nope"), Answer::Bool(true));

            assert_eq!(result, Err(AssessmentError::UnknownQuestion(qid("nope"))));
            assert_eq!(session, before);
        }

        #[test]
        fn non_pending_question_is_rejected() {
            let kb = kb();
            let mut session = started(&kb);
            let result =
                manager().submit_answer(&kb, &mut session, &qid("night_pain"), Answer::Bool(true));
            assert!(matches!(result, Err(AssessmentError::QuestionNotPending { .. })));
            assert!(session.answered_question_ids().is_empty());
        }

        #[test]
        fn answered_question_is_rejected() {
            let kb = kb();
            let mut session = started(&kb);
            manager()
                .submit_answer(&kb, &mut session, &qid("bladder"), Answer::Bool(false))
                .unwrap();

            let result =
                manager().submit_answer(&kb, &mut session, &qid("bladder"), Answer::Bool(false));
            assert_eq!(result, Err(AssessmentError::AlreadyAnswered(qid("bladder"))));
            assert_eq!(session.answered_count(), 1);
        }

        #[test]
        fn answer_before_start_is_invalid_state() {
            let kb = kb();
            let mut session = AssessmentSession::new(&kb);
            let result =
                manager().submit_answer(&kb, &mut session, &qid("bladder"), Answer::Bool(false));
            assert_eq!(result, Err(AssessmentError::InvalidState(AssessmentState::Init)));
        }
    }

    mod referral {
        use super::*;

        #[test]
        fn urgent_red_flag_terminates_with_referral() {
            let kb = kb();
            let mut session = started(&kb);
            let outcome = manager()
                .submit_answer(&kb, &mut session, &qid("bladder"), Answer::Bool(true))
                .unwrap();

            let TurnOutcome::Terminated(AssessmentOutcome::Referral(referral)) = outcome else {
                panic!("expected referral, got {:?}", outcome);
            };
            assert_eq!(referral.urgency, UrgencyLevel::Urgent);
            assert!(referral.message.contains("cauda equina"));
            assert_eq!(
                session.state(),
                AssessmentState::Terminated(Termination::Referral)
            );
            assert!(session.pending_question().is_none());
        }

        #[test]
        fn terminated_session_rejects_answers() {
            let kb = kb();
            let mut session = started(&kb);
            manager()
                .submit_answer(&kb, &mut session, &qid("bladder"), Answer::Bool(true))
                .unwrap();

            let result =
                manager().submit_answer(&kb, &mut session, &qid("night_pain"), Answer::Bool(true));
            assert_eq!(
                result,
                Err(AssessmentError::InvalidState(AssessmentState::Terminated(
                    Termination::Referral
                )))
            );
        }

        #[test]
        fn moderate_flag_does_not_terminate() {
            let kb = kb();
            let mut session = started(&kb);
            let m = ConversationManager::new(
                SelectorConfig::default(),
                CompletenessConfig {
                    threshold: 100,
                    ..CompletenessConfig::default()
                },
            );
            m.submit_answer(&kb, &mut session, &qid("bladder"), Answer::Bool(false))
                .unwrap();
            m.submit_answer(&kb, &mut session, &qid("night_pain"), Answer::Bool(true))
                .unwrap();
            let outcome = m
                .submit_answer(&kb, &mut session, &qid("describe"), Answer::text("numbness"))
                .unwrap();

            assert!(matches!(outcome, TurnOutcome::NextQuestion(_)));
            assert_eq!(session.urgency(), Some(UrgencyLevel::Moderate));
        }
    }

    mod advance {
        use super::*;

        #[test]
        fn valid_recommendation_is_followed() {
            let kb = kb();
            let mut session = started(&kb);
            let m = manager();
            let progress = m
                .record_answer(&kb, &mut session, &qid("bladder"), Answer::Bool(false))
                .unwrap();
            assert_eq!(progress, TurnProgress::Continue);

            let outcome = m.advance(&kb, &mut session, Some(&qid("history"))).unwrap();
            assert_eq!(outcome, TurnOutcome::NextQuestion(kb.question(&qid("history")).unwrap()));
        }

        #[test]
        fn answered_recommendation_falls_back_to_selector() {
            let kb = kb();
            let mut session = started(&kb);
            let m = manager();
            m.record_answer(&kb, &mut session, &qid("bladder"), Answer::Bool(false))
                .unwrap();

            let outcome = m.advance(&kb, &mut session, Some(&qid("bladder"))).unwrap();
            let TurnOutcome::NextQuestion(question) = outcome else {
                panic!("expected a question");
            };
            assert_ne!(question.id, qid("bladder"));
        }

        #[test]
        fn exhausted_questions_terminate_with_diagnosis() {
            let kb = kb();
            let mut session = started(&kb);
            let m = ConversationManager::new(
                SelectorConfig::default(),
                CompletenessConfig {
                    threshold: 100,
                    max_questions: 100,
                    ..CompletenessConfig::default()
                },
            );
            let mut last = None;
            while let Some(pending) = session.pending_question().cloned() {
                last = Some(
                    m.submit_answer(&kb, &mut session, &pending, Answer::text("unclear"))
                        .unwrap(),
                );
            }

            let Some(TurnOutcome::Terminated(AssessmentOutcome::Diagnosis(diagnosis))) = last
            else {
                panic!("expected diagnosis");
            };
            assert_eq!(diagnosis.trigger, DiagnosisTrigger::QuestionsExhausted);
            assert_eq!(session.answered_count(), kb.questions().len());
        }
    }

    #[test]
    fn yes_to_night_pain_favours_c1() {
        let kb = kb();
        let mut session = started(&kb);
        let m = manager();
        m.submit_answer(&kb, &mut session, &qid("bladder"), Answer::Bool(false))
            .unwrap();
        m.submit_answer(&kb, &mut session, &qid("night_pain"), Answer::text("yes"))
            .unwrap();

        assert_eq!(session.belief_status(), BeliefStatus::Updated);
        let c1 = session.posterior(&ConditionId::new("c1").unwrap()).unwrap();
        let c2 = session.posterior(&ConditionId::new("c2").unwrap()).unwrap();
        assert!(c1 > c2);
        assert!((c1 + c2 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn diagnostics_are_idempotent() {
        let kb = kb();
        let mut session = started(&kb);
        manager()
            .submit_answer(&kb, &mut session, &qid("bladder"), Answer::Bool(false))
            .unwrap();

        let first = manager().diagnostics(&kb, &session);
        let second = manager().diagnostics(&kb, &session);
        assert_eq!(first, second);
        assert_eq!(first.answered_count, 1);
        assert_eq!(first.started_at, session.started_at());
        assert!(first.updated_at >= first.started_at);
    }

    #[test]
    fn reset_restores_prior_only_session() {
        let kb = kb();
        let mut session = started(&kb);
        let id = session.id();
        manager()
            .submit_answer(&kb, &mut session, &qid("bladder"), Answer::Bool(true))
            .unwrap();

        manager().reset(&kb, &mut session);

        assert_eq!(session.id(), id);
        assert_eq!(session.state(), AssessmentState::Init);
        assert!(session.responses().is_empty());
        assert_eq!(session.urgency(), None);
        assert_eq!(session.posteriors(), &BeliefEngine::prior_beliefs(&kb));
        assert!(manager().start(&kb, &mut session).is_ok());
    }
}
