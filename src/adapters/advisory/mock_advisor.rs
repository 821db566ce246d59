//! Mock Question Advisor for testing.
//!
//! Scripted recommendations, simulated latency and call tracking, so the
//! failover path and the application handlers can be exercised without a
//! remote service.
//!
//! # Example
//!
//! ```ignore
//! let advisor = MockQuestionAdvisor::new()
//!     .with_recommendation("onset_trauma")
//!     .with_delay(Duration::from_millis(100));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::assessment::AssessmentSession;
use crate::domain::foundation::QuestionId;
use crate::domain::knowledge::KnowledgeBase;
use crate::ports::{AdvisorInfo, AdvisoryError, QuestionAdvisor};

/// A scripted mock reply.
#[derive(Debug, Clone)]
pub enum MockAdvice {
    /// Recommend this question id (not validated against the catalog).
    Recommend(String),
    /// Return `Ok(None)`.
    NoOpinion,
    /// Return this error.
    Error(AdvisoryError),
}

/// Mock advisor that replays scripted replies in order.
///
/// Once the script is exhausted every call returns `Ok(None)`.
#[derive(Debug, Clone)]
pub struct MockQuestionAdvisor {
    script: Arc<Mutex<VecDeque<MockAdvice>>>,
    delay: Duration,
    calls: Arc<Mutex<u32>>,
    info: AdvisorInfo,
}

impl Default for MockQuestionAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockQuestionAdvisor {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(0)),
            info: AdvisorInfo::remote("mock"),
        }
    }

    /// Queues a recommendation.
    pub fn with_recommendation(self, question_id: impl Into<String>) -> Self {
        self.push(MockAdvice::Recommend(question_id.into()))
    }

    /// Queues a "no opinion" reply.
    pub fn with_no_opinion(self) -> Self {
        self.push(MockAdvice::NoOpinion)
    }

    /// Queues an error.
    pub fn with_error(self, error: AdvisoryError) -> Self {
        self.push(MockAdvice::Error(error))
    }

    /// Sets the simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of `recommend` calls so far.
    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(self, advice: MockAdvice) -> Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(advice);
        self
    }

    fn next_advice(&self) -> MockAdvice {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(MockAdvice::NoOpinion)
    }
}

#[async_trait]
impl QuestionAdvisor for MockQuestionAdvisor {
    async fn recommend(
        &self,
        _kb: &KnowledgeBase,
        _session: &AssessmentSession,
    ) -> Result<Option<QuestionId>, AdvisoryError> {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_advice() {
            MockAdvice::Recommend(id) => QuestionId::new(id)
                .map(Some)
                .map_err(|e| AdvisoryError::parse(e.to_string())),
            MockAdvice::NoOpinion => Ok(None),
            MockAdvice::Error(err) => Err(err),
        }
    }

    fn advisor_info(&self) -> AdvisorInfo {
        self.info.clone()
    }
}
