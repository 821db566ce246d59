//! Local Question Advisor - the deterministic selector behind the advisor port.
//!
//! Never fails and never calls out, which makes it the fallback of every
//! remote advisor.

use async_trait::async_trait;

use crate::domain::assessment::{AssessmentSession, QuestionSelector, SelectorConfig};
use crate::domain::foundation::QuestionId;
use crate::domain::knowledge::KnowledgeBase;
use crate::ports::{AdvisorInfo, AdvisoryError, QuestionAdvisor};

/// Advisor backed by the in-process [`QuestionSelector`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalQuestionAdvisor {
    selector: QuestionSelector,
}

impl LocalQuestionAdvisor {
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            selector: QuestionSelector::new(config),
        }
    }
}

#[async_trait]
impl QuestionAdvisor for LocalQuestionAdvisor {
    async fn recommend(
        &self,
        kb: &KnowledgeBase,
        session: &AssessmentSession,
    ) -> Result<Option<QuestionId>, AdvisoryError> {
        Ok(self
            .selector
            .select_next(kb, session)
            .map(|selection| selection.question.id.clone()))
    }

    fn advisor_info(&self) -> AdvisorInfo {
        AdvisorInfo::local("local")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::knowledge::BuiltinCatalog;
    use crate::domain::assessment::ConversationManager;
    use crate::ports::KnowledgeBaseSource;

    #[tokio::test]
    async fn recommends_what_the_selector_would_pick() {
        let kb = BuiltinCatalog.load().unwrap();
        let session = AssessmentSession::new(&kb);
        let advisor = LocalQuestionAdvisor::default();

        let recommended = advisor.recommend(&kb, &session).await.unwrap();
        let expected = QuestionSelector::default()
            .select_next(&kb, &session)
            .map(|s| s.question.id.clone());

        assert_eq!(recommended, expected);
        assert!(recommended.is_some());
    }

    #[tokio::test]
    async fn never_recommends_an_answered_question() {
        let kb = BuiltinCatalog.load().unwrap();
        let manager = ConversationManager::default();
        let mut session = AssessmentSession::new(&kb);
        let first = manager.start(&kb, &mut session).unwrap().id.clone();
        manager
            .record_answer(&kb, &mut session, &first, false.into())
            .unwrap();

        let recommended = LocalQuestionAdvisor::default()
            .recommend(&kb, &session)
            .await
            .unwrap();

        assert_ne!(recommended, Some(first));
    }

    #[test]
    fn reports_local_info() {
        assert!(!LocalQuestionAdvisor::default().advisor_info().remote);
    }
}
