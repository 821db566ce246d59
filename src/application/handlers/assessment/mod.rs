//! Assessment command and query handlers.

mod context;
mod end_assessment;
mod get_diagnostics;
mod preview_questions;
mod reset_assessment;
mod start_assessment;
mod submit_answer;

pub use context::AssessmentContext;
pub use end_assessment::{EndAssessmentCommand, EndAssessmentHandler, EndAssessmentResult};
pub use get_diagnostics::{GetDiagnosticsHandler, GetDiagnosticsQuery};
pub use preview_questions::{PreviewQuestionsHandler, PreviewQuestionsQuery, QuestionPreview};
pub use reset_assessment::{ResetAssessmentCommand, ResetAssessmentHandler, ResetAssessmentResult};
pub use start_assessment::{StartAssessmentCommand, StartAssessmentHandler, StartAssessmentResult};
pub use submit_answer::{NextStep, SubmitAnswerCommand, SubmitAnswerHandler, SubmitAnswerResult};
