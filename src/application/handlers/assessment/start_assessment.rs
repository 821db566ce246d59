//! StartAssessmentHandler - Command handler for opening a new assessment.

use crate::domain::assessment::{AssessmentError, AssessmentSession};
use crate::domain::foundation::SessionId;
use crate::domain::knowledge::QuestionTemplate;

use super::context::AssessmentContext;

/// Command to start a new assessment.
#[derive(Debug, Clone, Default)]
pub struct StartAssessmentCommand;

/// Result of a successful start.
#[derive(Debug, Clone)]
pub struct StartAssessmentResult {
    pub session_id: SessionId,
    pub question: QuestionTemplate,
}

/// Handler for starting assessments.
pub struct StartAssessmentHandler {
    context: AssessmentContext,
}

impl StartAssessmentHandler {
    pub fn new(context: AssessmentContext) -> Self {
        Self { context }
    }

    pub async fn handle(
        &self,
        _cmd: StartAssessmentCommand,
    ) -> Result<StartAssessmentResult, AssessmentError> {
        let kb = self.context.knowledge_base();

        // 1. Fresh session with prior beliefs
        let mut session = AssessmentSession::new(kb);

        // 2. First question
        let question = self.context.manager().start(kb, &mut session)?.clone();

        // 3. Persist
        self.context.save(&session).await?;

        Ok(StartAssessmentResult {
            session_id: session.id(),
            question,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::assessment::context::test_support::context;
    use crate::domain::assessment::AssessmentState;

    #[tokio::test]
    async fn start_persists_session_awaiting_first_answer() {
        let context = context();
        let handler = StartAssessmentHandler::new(context.clone());

        let result = handler.handle(StartAssessmentCommand).await.unwrap();

        let stored = context.store().load(result.session_id).await.unwrap();
        assert_eq!(stored.state(), AssessmentState::AwaitingAnswer);
        assert_eq!(stored.pending_question(), Some(&result.question.id));
    }

    #[tokio::test]
    async fn first_question_screens_for_red_flags() {
        let handler = StartAssessmentHandler::new(context());

        let result = handler.handle(StartAssessmentCommand).await.unwrap();

        assert!(result.question.red_flag);
        assert_eq!(result.question.id.as_str(), "rf_bowel_bladder");
    }

    #[tokio::test]
    async fn each_start_creates_a_distinct_session() {
        let handler = StartAssessmentHandler::new(context());

        let a = handler.handle(StartAssessmentCommand).await.unwrap();
        let b = handler.handle(StartAssessmentCommand).await.unwrap();

        assert_ne!(a.session_id, b.session_id);
    }
}
