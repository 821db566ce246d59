//! Assessment lifecycle state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// How a terminated assessment ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Enough information was gathered to rank the differential.
    Diagnosis,
    /// A safety-critical finding requires referral.
    Referral,
}

/// The lifecycle state of an assessment session.
///
/// - `Init`: created or reset, no question asked yet
/// - `AwaitingAnswer`: a question is pending
/// - `Terminated`: absorbing, holds a diagnosis or a referral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentState {
    #[default]
    Init,
    AwaitingAnswer,
    Terminated(Termination),
}

impl AssessmentState {
    /// Returns true if an answer can be submitted in this state.
    pub fn accepts_answers(&self) -> bool {
        matches!(self, Self::AwaitingAnswer)
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::AwaitingAnswer => "awaiting_answer",
            Self::Terminated(Termination::Diagnosis) => "terminated_diagnosis",
            Self::Terminated(Termination::Referral) => "terminated_referral",
        }
    }
}

impl fmt::Display for AssessmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl StateMachine for AssessmentState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use AssessmentState::*;
        matches!(
            (self, target),
            // First question asked
            (Init, AwaitingAnswer) |
            // Answer accepted, next question asked
            (AwaitingAnswer, AwaitingAnswer) |
            // Answer accepted, dialogue ends
            (AwaitingAnswer, Terminated(_))
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use AssessmentState::*;
        match self {
            Init => vec![AwaitingAnswer],
            AwaitingAnswer => vec![
                AwaitingAnswer,
                Terminated(Termination::Diagnosis),
                Terminated(Termination::Referral),
            ],
            Terminated(_) => vec![],
        }
    }
}
