//! GetDiagnosticsHandler - Query handler for the current differential.

use crate::domain::assessment::{AssessmentError, DiagnosticsSnapshot};
use crate::domain::foundation::SessionId;

use super::context::AssessmentContext;

/// Query for a session's diagnostics.
#[derive(Debug, Clone)]
pub struct GetDiagnosticsQuery {
    pub session_id: SessionId,
}

/// Handler for reading diagnostics. Never modifies the session.
pub struct GetDiagnosticsHandler {
    context: AssessmentContext,
}

impl GetDiagnosticsHandler {
    pub fn new(context: AssessmentContext) -> Self {
        Self { context }
    }

    pub async fn handle(&self, query: GetDiagnosticsQuery) -> Result<DiagnosticsSnapshot, AssessmentError> {
        let session = self.context.load(query.session_id).await?;
        Ok(self
            .context
            .manager()
            .diagnostics(self.context.knowledge_base(), &session))
    }
}
