//! EndAssessmentHandler - Command handler for closing a session.

use crate::domain::assessment::{AssessmentError, AssessmentOutcome, DiagnosticsSnapshot};
use crate::domain::foundation::SessionId;

use super::context::AssessmentContext;

/// Command to end a session and drop it from the store.
#[derive(Debug, Clone)]
pub struct EndAssessmentCommand {
    pub session_id: SessionId,
}

/// Final state of the ended session.
#[derive(Debug, Clone)]
pub struct EndAssessmentResult {
    /// `None` if the dialogue was abandoned before it terminated.
    pub outcome: Option<AssessmentOutcome>,
    pub diagnostics: DiagnosticsSnapshot,
}

/// Handler for ending sessions.
pub struct EndAssessmentHandler {
    context: AssessmentContext,
}

impl EndAssessmentHandler {
    pub fn new(context: AssessmentContext) -> Self {
        Self { context }
    }

    pub async fn handle(&self, cmd: EndAssessmentCommand) -> Result<EndAssessmentResult, AssessmentError> {
        let session = self.context.load(cmd.session_id).await?;
        let diagnostics = self
            .context
            .manager()
            .diagnostics(self.context.knowledge_base(), &session);

        self.context.store().delete(cmd.session_id).await?;

        tracing::info!(
            session_id = %cmd.session_id,
            state = %session.state(),
            answered = session.answered_count(),
            "Assessment ended"
        );

        Ok(EndAssessmentResult {
            outcome: session.outcome().cloned(),
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::assessment::context::test_support::context;
    use crate::application::handlers::assessment::{
        StartAssessmentCommand, StartAssessmentHandler, SubmitAnswerCommand, SubmitAnswerHandler,
    };
    use crate::domain::assessment::Answer;

    #[tokio::test]
    async fn abandoned_session_has_no_outcome_and_is_removed() {
        let context = context();
        let started = StartAssessmentHandler::new(context.clone())
            .handle(StartAssessmentCommand)
            .await
            .unwrap();

        let result = EndAssessmentHandler::new(context.clone())
            .handle(EndAssessmentCommand {
                session_id: started.session_id,
            })
            .await
            .unwrap();

        assert!(result.outcome.is_none());
        assert!(!context.store().exists(started.session_id).await.unwrap());
    }

    #[tokio::test]
    async fn referred_session_returns_referral() {
        let context = context();
        let started = StartAssessmentHandler::new(context.clone())
            .handle(StartAssessmentCommand)
            .await
            .unwrap();
        SubmitAnswerHandler::new(context.clone())
            .handle(SubmitAnswerCommand {
                session_id: started.session_id,
                question_id: started.question.id.clone(),
                answer: Answer::from("yes"),
            })
            .await
            .unwrap();

        let result = EndAssessmentHandler::new(context)
            .handle(EndAssessmentCommand {
                session_id: started.session_id,
            })
            .await
            .unwrap();

        assert!(matches!(result.outcome, Some(AssessmentOutcome::Referral(_))));
        assert_eq!(result.diagnostics.red_flags.len(), 1);
    }

    #[tokio::test]
    async fn ending_twice_is_not_found() {
        let context = context();
        let started = StartAssessmentHandler::new(context.clone())
            .handle(StartAssessmentCommand)
            .await
            .unwrap();
        let handler = EndAssessmentHandler::new(context);
        let cmd = EndAssessmentCommand {
            session_id: started.session_id,
        };
        handler.handle(cmd.clone()).await.unwrap();

        let err = handler.handle(cmd).await.unwrap_err();

        assert!(matches!(err, AssessmentError::SessionNotFound(_)));
    }
}
