//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod assessment;

pub use assessment::{
    // Shared dependencies
    AssessmentContext,
    // Commands
    EndAssessmentCommand, EndAssessmentHandler, EndAssessmentResult,
    ResetAssessmentCommand, ResetAssessmentHandler, ResetAssessmentResult,
    StartAssessmentCommand, StartAssessmentHandler, StartAssessmentResult,
    NextStep, SubmitAnswerCommand, SubmitAnswerHandler, SubmitAnswerResult,
    // Queries
    GetDiagnosticsHandler, GetDiagnosticsQuery,
    PreviewQuestionsHandler, PreviewQuestionsQuery, QuestionPreview,
};
