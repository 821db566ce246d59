//! In-Memory Session Store Adapter
//!
//! Stores assessment sessions in memory.
//! Suitable for the CLI, tests and single-process deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::assessment::AssessmentSession;
use crate::domain::foundation::SessionId;
use crate::ports::{AssessmentSessionStore, SessionStoreError};

/// In-memory storage for assessment sessions
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, AssessmentSession>>>,
}

impl InMemorySessionStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all stored sessions (useful for tests)
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }

    /// Get the number of stored sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssessmentSessionStore for InMemorySessionStore {
    async fn save(&self, session: &AssessmentSession) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id(), session.clone());
        Ok(())
    }

    async fn load(&self, id: SessionId) -> Result<AssessmentSession, SessionStoreError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .cloned()
            .ok_or(SessionStoreError::NotFound(id))
    }

    async fn exists(&self, id: SessionId) -> Result<bool, SessionStoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.contains_key(&id))
    }

    async fn delete(&self, id: SessionId) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionStoreError::NotFound(id))
    }
}
