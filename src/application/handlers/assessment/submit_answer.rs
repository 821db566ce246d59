//! SubmitAnswerHandler - Command handler for one dialogue turn.
//!
//! Records the answer, then consults the advisor for the next question
//! unless a red-flag question must be asked first or the dialogue ended.

use crate::domain::assessment::{
    Answer, AssessmentError, AssessmentOutcome, AssessmentSession, TurnOutcome, TurnProgress,
};
use crate::domain::foundation::{Percentage, QuestionId, SessionId};
use crate::domain::knowledge::{QuestionTemplate, UrgencyLevel};

use super::context::AssessmentContext;

/// Command to answer the pending question.
#[derive(Debug, Clone)]
pub struct SubmitAnswerCommand {
    pub session_id: SessionId,
    pub question_id: QuestionId,
    pub answer: Answer,
}

/// What happens next in the dialogue.
#[derive(Debug, Clone, PartialEq)]
pub enum NextStep {
    Ask(QuestionTemplate),
    Finished(AssessmentOutcome),
}

/// Result of a recorded answer.
#[derive(Debug, Clone)]
pub struct SubmitAnswerResult {
    pub session_id: SessionId,
    pub next: NextStep,
    pub urgency: Option<UrgencyLevel>,
    pub completion: Percentage,
}

/// Handler for submitting answers.
pub struct SubmitAnswerHandler {
    context: AssessmentContext,
}

impl SubmitAnswerHandler {
    pub fn new(context: AssessmentContext) -> Self {
        Self { context }
    }

    pub async fn handle(&self, cmd: SubmitAnswerCommand) -> Result<SubmitAnswerResult, AssessmentError> {
        let kb = self.context.knowledge_base();
        let manager = self.context.manager();

        // 1. Load session
        let mut session = self.context.load(cmd.session_id).await?;

        // 2. Record the answer; rejected answers leave the stored session as is
        let progress = manager.record_answer(kb, &mut session, &cmd.question_id, cmd.answer)?;

        // 3. Pick the next question or finish
        let next = match progress {
            TurnProgress::Terminated(outcome) => NextStep::Finished(outcome),
            TurnProgress::Continue => {
                let recommendation = self.recommendation(&session).await;
                match manager.advance(kb, &mut session, recommendation.as_ref())? {
                    TurnOutcome::NextQuestion(question) => NextStep::Ask(question.clone()),
                    TurnOutcome::Terminated(outcome) => NextStep::Finished(outcome),
                }
            }
        };

        // 4. Persist
        self.context.save(&session).await?;

        Ok(SubmitAnswerResult {
            session_id: session.id(),
            next,
            urgency: session.urgency(),
            completion: session.completion(),
        })
    }

    /// Advisor's pick, or `None` when a safety question takes precedence
    /// or the advisor fails.
    async fn recommendation(&self, session: &AssessmentSession) -> Option<QuestionId> {
        let kb = self.context.knowledge_base();
        if self.context.manager().safety_question(kb, session).is_some() {
            return None;
        }

        match self.context.advisor().recommend(kb, session).await {
            Ok(recommendation) => recommendation,
            Err(err) => {
                tracing::warn!(
                    session_id = %session.id(),
                    error = %err,
                    "Advisor failed; using local selection"
                );
                None
            }
        }
    }
}
