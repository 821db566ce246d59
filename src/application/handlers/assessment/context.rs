//! Shared dependencies of the assessment handlers.

use std::sync::Arc;

use crate::domain::assessment::{AssessmentError, AssessmentSession, ConversationManager};
use crate::domain::foundation::SessionId;
use crate::domain::knowledge::KnowledgeBase;
use crate::ports::{AssessmentSessionStore, QuestionAdvisor};

/// Everything a handler needs to run one step of an assessment.
///
/// Cheap to clone; the knowledge base and ports are shared.
#[derive(Clone)]
pub struct AssessmentContext {
    knowledge_base: Arc<KnowledgeBase>,
    store: Arc<dyn AssessmentSessionStore>,
    advisor: Arc<dyn QuestionAdvisor>,
    manager: ConversationManager,
}

impl AssessmentContext {
    pub fn new(
        knowledge_base: Arc<KnowledgeBase>,
        store: Arc<dyn AssessmentSessionStore>,
        advisor: Arc<dyn QuestionAdvisor>,
        manager: ConversationManager,
    ) -> Self {
        Self {
            knowledge_base,
            store,
            advisor,
            manager,
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn store(&self) -> &dyn AssessmentSessionStore {
        self.store.as_ref()
    }

    pub fn advisor(&self) -> &dyn QuestionAdvisor {
        self.advisor.as_ref()
    }

    pub fn manager(&self) -> &ConversationManager {
        &self.manager
    }

    pub(super) async fn load(&self, id: SessionId) -> Result<AssessmentSession, AssessmentError> {
        Ok(self.store.load(id).await?)
    }

    pub(super) async fn save(&self, session: &AssessmentSession) -> Result<(), AssessmentError> {
        Ok(self.store.save(session).await?)
    }
}
