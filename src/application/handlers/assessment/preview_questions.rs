//! PreviewQuestionsHandler - Query handler listing upcoming questions.
//!
//! Useful for clients that render a short "coming up" list. The preview
//! reflects the current beliefs; later answers may reorder it.

use serde::Serialize;

use crate::domain::assessment::{AssessmentError, SelectionReason};
use crate::domain::foundation::SessionId;
use crate::domain::knowledge::QuestionTemplate;

use super::context::AssessmentContext;

/// Query for the next `count` questions of a session.
#[derive(Debug, Clone)]
pub struct PreviewQuestionsQuery {
    pub session_id: SessionId,
    pub count: usize,
}

/// One upcoming question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionPreview {
    pub question: QuestionTemplate,
    /// `None` for the question already pending.
    pub reason: Option<SelectionReason>,
}

/// Handler for previewing questions. Never modifies the session.
pub struct PreviewQuestionsHandler {
    context: AssessmentContext,
}

impl PreviewQuestionsHandler {
    pub fn new(context: AssessmentContext) -> Self {
        Self { context }
    }

    pub async fn handle(&self, query: PreviewQuestionsQuery) -> Result<Vec<QuestionPreview>, AssessmentError> {
        let kb = self.context.knowledge_base();
        let session = self.context.load(query.session_id).await?;
        if session.is_terminated() || query.count == 0 {
            return Ok(Vec::new());
        }

        let pending = session.pending_question().and_then(|id| kb.question(id));
        let mut previews: Vec<QuestionPreview> = pending
            .map(|question| QuestionPreview {
                question: question.clone(),
                reason: None,
            })
            .into_iter()
            .collect();

        let upcoming = self
            .context
            .manager()
            .selector()
            .rank(kb, &session)
            .into_iter()
            .filter(|selection| Some(&selection.question.id) != session.pending_question())
            .take(query.count - previews.len())
            .map(|selection| QuestionPreview {
                question: selection.question.clone(),
                reason: Some(selection.reason),
            });
        previews.extend(upcoming);

        Ok(previews)
    }
}
