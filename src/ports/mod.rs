//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AssessmentSessionStore` - Keeps sessions between turns
//! - `QuestionAdvisor` - Next-question recommendations (local or remote)
//! - `KnowledgeBaseSource` - Loads the read-only clinical catalog

mod knowledge_source;
mod question_advisor;
mod session_store;

pub use knowledge_source::KnowledgeBaseSource;
pub use question_advisor::{
    AdvisorInfo, AdvisoryError, AdvisoryRequest, AdvisoryResponse, AnsweredQuestion,
    CandidateQuestion, ConditionBelief, QuestionAdvisor,
};
pub use session_store::{AssessmentSessionStore, SessionStoreError};
