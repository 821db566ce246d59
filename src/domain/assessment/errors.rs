//! Error types for the assessment domain

use crate::domain::foundation::{ErrorCode, QuestionId, SessionId};

use super::state::AssessmentState;

/// Errors raised by assessment operations.
///
/// Every rejection leaves the session unchanged.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum AssessmentError {
    #[error("Unknown question: {0}")]
    UnknownQuestion(QuestionId),

    #[error("Question {received} is not pending (expected {expected:?})")]
    QuestionNotPending {
        expected: Option<QuestionId>,
        received: QuestionId,
    },

    #[error("Question already answered: {0}")]
    AlreadyAnswered(QuestionId),

    #[error("Operation not allowed in state {0}")]
    InvalidState(AssessmentState),

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AssessmentError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AssessmentError::UnknownQuestion(_) => ErrorCode::QuestionNotFound,
            AssessmentError::QuestionNotPending { .. } => ErrorCode::QuestionNotPending,
            AssessmentError::AlreadyAnswered(_) => ErrorCode::QuestionAlreadyAnswered,
            AssessmentError::InvalidState(AssessmentState::Terminated(_)) => {
                ErrorCode::SessionTerminated
            }
            AssessmentError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            AssessmentError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            AssessmentError::Storage(_) => ErrorCode::StorageError,
        }
    }
}
