//! Assessment domain - the adaptive differential-diagnosis dialogue.
//!
//! All code here is synchronous and pure over an explicit
//! [`AssessmentSession`] value. Async concerns (session storage, remote
//! advisory) live behind ports in the application layer.
//!
//! # Module Organization
//!
//! - `answer` - Transport-agnostic answer values
//! - `finding` - Interpreted findings stored per category
//! - `belief` - Posterior probabilities over conditions
//! - `red_flag_monitor` - Safety-critical pattern detection
//! - `question_selector` - Deterministic next-question selection
//! - `completeness` - Coverage scoring and stopping rule
//! - `manager` - Lifecycle driver over the session
//! - `outcome` - Diagnosis, referral and diagnostics snapshots

mod answer;
mod belief;
mod completeness;
mod errors;
mod finding;
mod manager;
mod outcome;
mod question_selector;
mod red_flag_monitor;
mod session;
mod state;

pub use answer::Answer;
pub use belief::{BeliefEngine, BeliefStatus, BeliefUpdate};
pub use completeness::{
    CategoryRequirement, CompletenessConfig, CompletenessEvaluator, CompletenessReport,
};
pub use errors::AssessmentError;
pub use finding::{derive_findings, interpret, CategoryFindings, ClinicalFindings, Finding, FindingValue};
pub use manager::{ConversationManager, TurnOutcome, TurnProgress};
pub use outcome::{
    rank_conditions, AssessmentOutcome, ConfidenceLevel, DiagnosisResult, DiagnosisTrigger,
    DiagnosticsSnapshot, RankedCondition, ReferralResult,
};
pub use question_selector::{QuestionSelector, Selection, SelectionReason, SelectorConfig};
pub use red_flag_monitor::{DetectedRedFlag, RedFlagMonitor};
pub use session::{AssessmentSession, RecordedResponse};
pub use state::{AssessmentState, Termination};
