//! Session Store Port - Interface for keeping assessment sessions between turns.
//!
//! The domain works on an owned [`AssessmentSession`] value; the store is
//! where the application layer parks it between calls.

use async_trait::async_trait;

use crate::domain::assessment::{AssessmentError, AssessmentSession};
use crate::domain::foundation::SessionId;

/// Errors that can occur during session storage operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Failed to serialize session: {0}")]
    SerializationFailed(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<SessionStoreError> for AssessmentError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => AssessmentError::SessionNotFound(id),
            other => AssessmentError::Storage(other.to_string()),
        }
    }
}

/// Port for persisting and loading assessment sessions
#[async_trait]
pub trait AssessmentSessionStore: Send + Sync {
    /// Save a session, replacing any previous version
    ///
    /// # Errors
    /// Returns `SessionStoreError` if save fails
    async fn save(&self, session: &AssessmentSession) -> Result<(), SessionStoreError>;

    /// Load a session
    ///
    /// # Errors
    /// Returns `SessionStoreError::NotFound` if no session exists
    async fn load(&self, id: SessionId) -> Result<AssessmentSession, SessionStoreError>;

    /// Check if a session exists
    async fn exists(&self, id: SessionId) -> Result<bool, SessionStoreError>;

    /// Delete a session
    ///
    /// # Errors
    /// Returns `SessionStoreError::NotFound` if no session exists
    async fn delete(&self, id: SessionId) -> Result<(), SessionStoreError>;
}
