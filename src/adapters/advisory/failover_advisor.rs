//! Failover Question Advisor - remote advice with a deterministic safety net.
//!
//! Asks the primary advisor within a time budget. Whenever the primary
//! errors, times out, has no opinion, or recommends a question that is
//! unknown or already answered, the fallback advisor decides instead.
//!
//! # Example
//!
//! ```ignore
//! let remote = HttpQuestionAdvisor::new(http_config)?;
//!
//! let advisor = FailoverQuestionAdvisor::new(remote)
//!     .with_timeout(Duration::from_millis(1500));
//! ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::domain::assessment::AssessmentSession;
use crate::domain::foundation::QuestionId;
use crate::domain::knowledge::KnowledgeBase;
use crate::ports::{AdvisorInfo, AdvisoryError, QuestionAdvisor};

use super::LocalQuestionAdvisor;

/// Primary advisor wrapped with a time budget and a fallback.
///
/// The fallback defaults to the local selector, which never fails.
pub struct FailoverQuestionAdvisor<P: QuestionAdvisor, F: QuestionAdvisor = LocalQuestionAdvisor> {
    primary: P,
    fallback: F,
    timeout: Duration,
    fallbacks: AtomicU64,
}

impl<P: QuestionAdvisor> FailoverQuestionAdvisor<P, LocalQuestionAdvisor> {
    /// Wraps `primary` with the default local fallback.
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            fallback: LocalQuestionAdvisor::default(),
            timeout: Duration::from_millis(2000),
            fallbacks: AtomicU64::new(0),
        }
    }
}

impl<P: QuestionAdvisor, F: QuestionAdvisor> FailoverQuestionAdvisor<P, F> {
    /// Replaces the fallback advisor.
    pub fn with_fallback<G: QuestionAdvisor>(self, fallback: G) -> FailoverQuestionAdvisor<P, G> {
        FailoverQuestionAdvisor {
            primary: self.primary,
            fallback,
            timeout: self.timeout,
            fallbacks: self.fallbacks,
        }
    }

    /// Sets the time budget for the primary advisor.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How many recommendations were served by the fallback.
    pub fn fallback_count(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    async fn ask_primary(
        &self,
        kb: &KnowledgeBase,
        session: &AssessmentSession,
    ) -> Result<QuestionId, String> {
        let result = tokio::time::timeout(self.timeout, self.primary.recommend(kb, session))
            .await
            .map_err(|_| {
                AdvisoryError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                }
                .to_string()
            })?;

        match result {
            Ok(Some(id)) if kb.question(&id).is_none() => Err(format!("unknown question '{}'", id)),
            Ok(Some(id)) if session.has_answered(&id) => {
                Err(format!("question '{}' already answered", id))
            }
            Ok(Some(id)) => Ok(id),
            Ok(None) => Err("no recommendation".to_string()),
            Err(err) => Err(err.to_string()),
        }
    }
}

#[async_trait]
impl<P, F> QuestionAdvisor for FailoverQuestionAdvisor<P, F>
where
    P: QuestionAdvisor + 'static,
    F: QuestionAdvisor + 'static,
{
    async fn recommend(
        &self,
        kb: &KnowledgeBase,
        session: &AssessmentSession,
    ) -> Result<Option<QuestionId>, AdvisoryError> {
        match self.ask_primary(kb, session).await {
            Ok(id) => Ok(Some(id)),
            Err(reason) => {
                self.fallbacks.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    session_id = %session.id(),
                    primary = %self.primary.advisor_info().name,
                    fallback = %self.fallback.advisor_info().name,
                    reason = %reason,
                    "Advisor fell back"
                );
                self.fallback.recommend(kb, session).await
            }
        }
    }

    fn advisor_info(&self) -> AdvisorInfo {
        self.primary.advisor_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::advisory::MockQuestionAdvisor;
    use crate::adapters::knowledge::BuiltinCatalog;
    use crate::domain::assessment::{ConversationManager, QuestionSelector};
    use crate::ports::KnowledgeBaseSource;

    fn local_choice(kb: &KnowledgeBase, session: &AssessmentSession) -> Option<QuestionId> {
        QuestionSelector::default()
            .select_next(kb, session)
            .map(|s| s.question.id.clone())
    }

    #[tokio::test]
    async fn valid_primary_recommendation_is_used() {
        let kb = BuiltinCatalog.load().unwrap();
        let session = AssessmentSession::new(&kb);
        let advisor = FailoverQuestionAdvisor::new(
            MockQuestionAdvisor::new().with_recommendation("age_over_50"),
        );

        let recommended = advisor.recommend(&kb, &session).await.unwrap();

        assert_eq!(recommended, Some(QuestionId::new("age_over_50").unwrap()));
        assert_eq!(advisor.fallback_count(), 0);
    }

    #[tokio::test]
    async fn primary_error_uses_local_fallback() {
        let kb = BuiltinCatalog.load().unwrap();
        let session = AssessmentSession::new(&kb);
        let advisor = FailoverQuestionAdvisor::new(
            MockQuestionAdvisor::new().with_error(AdvisoryError::unavailable("down")),
        );

        let recommended = advisor.recommend(&kb, &session).await.unwrap();

        assert_eq!(recommended, local_choice(&kb, &session));
        assert_eq!(advisor.fallback_count(), 1);
    }

    #[tokio::test]
    async fn no_opinion_uses_local_fallback() {
        let kb = BuiltinCatalog.load().unwrap();
        let session = AssessmentSession::new(&kb);
        let advisor = FailoverQuestionAdvisor::new(MockQuestionAdvisor::new().with_no_opinion());

        let recommended = advisor.recommend(&kb, &session).await.unwrap();

        assert_eq!(recommended, local_choice(&kb, &session));
        assert_eq!(advisor.fallback_count(), 1);
    }

    #[tokio::test]
    async fn unknown_question_uses_local_fallback() {
        let kb = BuiltinCatalog.load().unwrap();
        let session = AssessmentSession::new(&kb);
        let advisor = FailoverQuestionAdvisor::new(
            MockQuestionAdvisor::new().with_recommendation("not_in_catalog"),
        );

        let recommended = advisor.recommend(&kb, &session).await.unwrap();

        assert_eq!(recommended, local_choice(&kb, &session));
        assert_eq!(advisor.fallback_count(), 1);
    }

    #[tokio::test]
    async fn answered_question_uses_local_fallback() {
        let kb = BuiltinCatalog.load().unwrap();
        let manager = ConversationManager::default();
        let mut session = AssessmentSession::new(&kb);
        let first = manager.start(&kb, &mut session).unwrap().id.clone();
        manager
            .record_answer(&kb, &mut session, &first, false.into())
            .unwrap();
        let advisor = FailoverQuestionAdvisor::new(
            MockQuestionAdvisor::new().with_recommendation(first.as_str()),
        );

        let recommended = advisor.recommend(&kb, &session).await.unwrap();

        assert_ne!(recommended, Some(first));
        assert_eq!(advisor.fallback_count(), 1);
    }

    #[tokio::test]
    async fn slow_primary_times_out_to_fallback() {
        let kb = BuiltinCatalog.load().unwrap();
        let session = AssessmentSession::new(&kb);
        let advisor = FailoverQuestionAdvisor::new(
            MockQuestionAdvisor::new()
                .with_recommendation("age_over_50")
                .with_delay(Duration::from_millis(200)),
        )
        .with_timeout(Duration::from_millis(20));

        let recommended = advisor.recommend(&kb, &session).await.unwrap();

        assert_eq!(recommended, local_choice(&kb, &session));
        assert_eq!(advisor.fallback_count(), 1);
    }

    #[tokio::test]
    async fn custom_fallback_is_consulted() {
        let kb = BuiltinCatalog.load().unwrap();
        let session = AssessmentSession::new(&kb);
        let fallback = MockQuestionAdvisor::new().with_recommendation("previous_episodes");
        let advisor = FailoverQuestionAdvisor::new(MockQuestionAdvisor::new())
            .with_fallback(fallback.clone());

        let recommended = advisor.recommend(&kb, &session).await.unwrap();

        assert_eq!(recommended, Some(QuestionId::new("previous_episodes").unwrap()));
        assert_eq!(fallback.call_count(), 1);
    }

    #[test]
    fn reports_primary_info() {
        let advisor = FailoverQuestionAdvisor::new(MockQuestionAdvisor::new());
        assert_eq!(advisor.advisor_info().name, "mock");
    }
}
