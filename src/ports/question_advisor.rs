//! Question Advisor Port - Interface for next-question recommendations.
//!
//! The conversation manager can ask an advisor which question to ask next.
//! Implementations are interchangeable: a deterministic local advisor, a
//! remote advisory service, and a failover wrapper that composes the two.
//!
//! # Design
//!
//! - Advisors only *recommend*; the manager validates every recommendation
//!   and always applies red-flag priority itself
//! - `Ok(None)` means "no opinion" and is treated like a failure by the
//!   failover wrapper
//! - Errors carry enough detail to decide whether to fall back
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct AlwaysFirst;
//!
//! #[async_trait]
//! impl QuestionAdvisor for AlwaysFirst {
//!     async fn recommend(
//!         &self,
//!         kb: &KnowledgeBase,
//!         _session: &AssessmentSession,
//!     ) -> Result<Option<QuestionId>, AdvisoryError> {
//!         Ok(kb.questions().first().map(|q| q.id.clone()))
//!     }
//!
//!     fn advisor_info(&self) -> AdvisorInfo {
//!         AdvisorInfo::local("always-first")
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::assessment::{AssessmentSession, BeliefEngine};
use crate::domain::foundation::{ConditionId, QuestionId, SessionId};
use crate::domain::knowledge::{KnowledgeBase, PromptType, QuestionCategory, UrgencyLevel};

/// Port for next-question recommendations.
#[async_trait]
pub trait QuestionAdvisor: Send + Sync {
    /// Recommend the next question for the session.
    ///
    /// Returns `Ok(None)` when the advisor has no recommendation.
    async fn recommend(
        &self,
        kb: &KnowledgeBase,
        session: &AssessmentSession,
    ) -> Result<Option<QuestionId>, AdvisoryError>;

    /// Get advisor information (name, whether it calls out).
    fn advisor_info(&self) -> AdvisorInfo;
}

/// Advisor information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorInfo {
    /// Advisor name (e.g., "local", "http").
    pub name: String,
    /// Whether recommendations come from a remote service.
    pub remote: bool,
}

impl AdvisorInfo {
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote: false,
        }
    }

    pub fn remote(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote: true,
        }
    }
}

/// Wire snapshot of a session sent to remote advisors.
///
/// Contains only what a recommender needs: what was asked, how it was
/// answered, the current differential and the open candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    pub session_id: SessionId,
    pub turn: u32,
    pub answered: Vec<AnsweredQuestion>,
    pub leading_conditions: Vec<ConditionBelief>,
    pub urgency: Option<UrgencyLevel>,
    pub candidates: Vec<CandidateQuestion>,
}

/// A question already answered in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question_id: QuestionId,
    pub answer: String,
    pub parseable: bool,
}

/// A condition and its current posterior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionBelief {
    pub condition_id: ConditionId,
    pub posterior: f64,
}

/// An unanswered question the advisor may pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateQuestion {
    pub question_id: QuestionId,
    pub prompt: String,
    pub category: QuestionCategory,
    pub prompt_type: PromptType,
}

impl AdvisoryRequest {
    /// Builds the snapshot, listing at most `top_k` leading conditions.
    pub fn from_session(kb: &KnowledgeBase, session: &AssessmentSession, top_k: usize) -> Self {
        let answered = session
            .answered_question_ids()
            .iter()
            .filter_map(|id| {
                session.response(id).map(|response| AnsweredQuestion {
                    question_id: id.clone(),
                    answer: response.answer.to_string(),
                    parseable: response.value.is_parseable(),
                })
            })
            .collect();

        let leading_conditions = BeliefEngine::top_k(session.posteriors(), top_k)
            .into_iter()
            .map(|(condition_id, posterior)| ConditionBelief {
                condition_id,
                posterior,
            })
            .collect();

        let candidates = kb
            .questions()
            .iter()
            .filter(|q| !session.has_answered(&q.id))
            .map(|q| CandidateQuestion {
                question_id: q.id.clone(),
                prompt: q.prompt.clone(),
                category: q.category,
                prompt_type: q.prompt_type,
            })
            .collect();

        Self {
            session_id: session.id(),
            turn: session.turn(),
            answered,
            leading_conditions,
            urgency: session.urgency(),
            candidates,
        }
    }
}

/// Expected response body from a remote advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryResponse {
    #[serde(default)]
    pub question_id: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
}

/// Advisory errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdvisoryError {
    /// Advisor is unavailable or disabled.
    #[error("advisor unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Rate limited by the advisory service.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse advisor response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Request timed out.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },
}

impl AdvisoryError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AdvisoryError::RateLimited { .. }
                | AdvisoryError::Unavailable { .. }
                | AdvisoryError::Network(_)
                | AdvisoryError::Timeout { .. }
        )
    }
}
