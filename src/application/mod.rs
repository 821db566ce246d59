//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::{
    AssessmentContext,
    EndAssessmentCommand, EndAssessmentHandler, EndAssessmentResult,
    GetDiagnosticsHandler, GetDiagnosticsQuery,
    NextStep, PreviewQuestionsHandler, PreviewQuestionsQuery, QuestionPreview,
    ResetAssessmentCommand, ResetAssessmentHandler, ResetAssessmentResult,
    StartAssessmentCommand, StartAssessmentHandler, StartAssessmentResult,
    SubmitAnswerCommand, SubmitAnswerHandler, SubmitAnswerResult,
};
