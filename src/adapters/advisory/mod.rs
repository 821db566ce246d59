//! Question Advisor Adapters.
//!
//! Implementations of the QuestionAdvisor port.
//!
//! ## Available Adapters
//!
//! - `LocalQuestionAdvisor` - Deterministic in-process selector
//! - `HttpQuestionAdvisor` - Remote advisory service over HTTP
//! - `FailoverQuestionAdvisor` - Primary advisor with timeout and local fallback
//! - `MockQuestionAdvisor` - Scripted advisor for testing

mod failover_advisor;
mod http_advisor;
mod local_advisor;
mod mock_advisor;

pub use failover_advisor::FailoverQuestionAdvisor;
pub use http_advisor::{HttpAdvisorConfig, HttpQuestionAdvisor};
pub use local_advisor::LocalQuestionAdvisor;
pub use mock_advisor::{MockAdvice, MockQuestionAdvisor};
