//! ResetAssessmentHandler - Command handler for starting over in place.

use crate::domain::assessment::AssessmentError;
use crate::domain::foundation::SessionId;
use crate::domain::knowledge::QuestionTemplate;

use super::context::AssessmentContext;

/// Command to discard all answers and restart a session.
#[derive(Debug, Clone)]
pub struct ResetAssessmentCommand {
    pub session_id: SessionId,
}

/// Result of a reset: the same session, back at its first question.
#[derive(Debug, Clone)]
pub struct ResetAssessmentResult {
    pub session_id: SessionId,
    pub question: QuestionTemplate,
}

/// Handler for resetting sessions. Works in any state, including terminated.
pub struct ResetAssessmentHandler {
    context: AssessmentContext,
}

impl ResetAssessmentHandler {
    pub fn new(context: AssessmentContext) -> Self {
        Self { context }
    }

    pub async fn handle(&self, cmd: ResetAssessmentCommand) -> Result<ResetAssessmentResult, AssessmentError> {
        let kb = self.context.knowledge_base();
        let manager = self.context.manager();

        let mut session = self.context.load(cmd.session_id).await?;
        manager.reset(kb, &mut session);
        let question = manager.start(kb, &mut session)?.clone();

        self.context.save(&session).await?;

        Ok(ResetAssessmentResult {
            session_id: session.id(),
            question,
        })
    }
}
