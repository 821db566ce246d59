//! Clinical categories used to group questions and findings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Clinical category a question template belongs to.
///
/// Completeness requirements and the red-flag priority rule are both
/// expressed per question category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    RedFlagScreening,
    Pain,
    Neurological,
    RangeOfMotion,
    Motor,
    Functional,
    History,
}

impl QuestionCategory {
    /// Every category, in display order.
    pub const ALL: [QuestionCategory; 7] = [
        QuestionCategory::RedFlagScreening,
        QuestionCategory::Pain,
        QuestionCategory::Neurological,
        QuestionCategory::RangeOfMotion,
        QuestionCategory::Motor,
        QuestionCategory::Functional,
        QuestionCategory::History,
    ];

    /// Returns the snake_case label used in catalogs and logs.
    pub fn label(&self) -> &'static str {
        match self {
            QuestionCategory::RedFlagScreening => "red_flag_screening",
            QuestionCategory::Pain => "pain",
            QuestionCategory::Neurological => "neurological",
            QuestionCategory::RangeOfMotion => "range_of_motion",
            QuestionCategory::Motor => "motor",
            QuestionCategory::Functional => "functional",
            QuestionCategory::History => "history",
        }
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category under which a derived finding is stored in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    Pain,
    Neurological,
    RangeOfMotion,
    Motor,
    Objective,
    Functional,
    History,
}

impl FindingCategory {
    pub const ALL: [FindingCategory; 7] = [
        FindingCategory::Pain,
        FindingCategory::Neurological,
        FindingCategory::RangeOfMotion,
        FindingCategory::Motor,
        FindingCategory::Objective,
        FindingCategory::Functional,
        FindingCategory::History,
    ];
}

/// Topic used for the deterministic fallback ordering of questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionTopic {
    RedFlagScreening,
    PainSeverity,
    PainLocation,
    OnsetMechanism,
    AggravatingRelieving,
    FunctionalImpact,
    History,
}

impl QuestionTopic {
    /// The order in which topics are covered when no discriminative
    /// signal is available.
    pub const FALLBACK_ORDER: [QuestionTopic; 7] = [
        QuestionTopic::RedFlagScreening,
        QuestionTopic::PainSeverity,
        QuestionTopic::PainLocation,
        QuestionTopic::OnsetMechanism,
        QuestionTopic::AggravatingRelieving,
        QuestionTopic::FunctionalImpact,
        QuestionTopic::History,
    ];

    /// Position of this topic in the fallback order.
    pub fn rank(&self) -> usize {
        match self {
            QuestionTopic::RedFlagScreening => 0,
            QuestionTopic::PainSeverity => 1,
            QuestionTopic::PainLocation => 2,
            QuestionTopic::OnsetMechanism => 3,
            QuestionTopic::AggravatingRelieving => 4,
            QuestionTopic::FunctionalImpact => 5,
            QuestionTopic::History => 6,
        }
    }
}
