//! Question templates and the evidence keys they can produce.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::QuestionId;

use super::category::{FindingCategory, QuestionCategory, QuestionTopic};

/// Upper bound of every numeric scale question (0..=10).
pub const SCALE_MAX: u8 = 10;

/// How the patient is expected to answer a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptType {
    YesNo,
    SingleChoice,
    MultiChoice,
    NumericScale,
    FreeText,
}

impl PromptType {
    /// Returns true for prompt types that carry an option list.
    pub fn is_choice(&self) -> bool {
        matches!(self, PromptType::SingleChoice | PromptType::MultiChoice)
    }
}

/// Severity band for a 0-10 scale answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleBand {
    None,
    Mild,
    Moderate,
    Severe,
}

impl ScaleBand {
    pub const ALL: [ScaleBand; 4] = [
        ScaleBand::None,
        ScaleBand::Mild,
        ScaleBand::Moderate,
        ScaleBand::Severe,
    ];

    /// Band for a scale value: 0 / 1-3 / 4-6 / 7-10.
    pub fn from_value(value: u8) -> Self {
        match value {
            0 => ScaleBand::None,
            1..=3 => ScaleBand::Mild,
            4..=6 => ScaleBand::Moderate,
            _ => ScaleBand::Severe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleBand::None => "none",
            ScaleBand::Mild => "mild",
            ScaleBand::Moderate => "moderate",
            ScaleBand::Severe => "severe",
        }
    }
}

/// Qualifier of the evidence key recorded for a "no", e.g. `pain_night:no`.
pub const NEGATIVE_QUALIFIER: &str = "no";

/// Builds the evidence key for a qualified finding, e.g. `onset:sudden`.
pub fn qualified_key(finding_key: &str, qualifier: &str) -> String {
    format!("{}:{}", finding_key, qualifier)
}

/// Canonical form of a choice option: trimmed, lowercase, spaces as `_`.
pub fn normalize_option(option: &str) -> String {
    option
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn default_priority() -> f64 {
    1.0
}

/// A question the engine can ask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionTemplate {
    pub id: QuestionId,
    pub prompt: String,
    pub category: QuestionCategory,
    pub prompt_type: PromptType,
    /// Allowed answers for choice prompts.
    #[serde(default)]
    pub options: Vec<String>,
    /// Finding keys the answer is recorded under.
    #[serde(default)]
    pub finding_keys: Vec<String>,
    pub finding_category: FindingCategory,
    #[serde(default)]
    pub topic: Option<QuestionTopic>,
    /// Static priority weight, used as tie-breaker.
    #[serde(default = "default_priority")]
    pub priority: f64,
    /// How many conditions this question is expected to help separate.
    #[serde(default)]
    pub discriminative_hint: u32,
    /// Answering "yes" surfaces a red flag.
    #[serde(default)]
    pub red_flag: bool,
}

impl QuestionTemplate {
    /// Keys the answer will be stored under; free-text questions without
    /// explicit keys are stored under their own id.
    pub fn storage_keys(&self) -> Vec<String> {
        if self.finding_keys.is_empty() {
            vec![self.id.as_str().to_string()]
        } else {
            self.finding_keys.clone()
        }
    }

    /// Every evidence key an answer to this question could produce.
    pub fn candidate_evidence_keys(&self) -> Vec<String> {
        match self.prompt_type {
            PromptType::YesNo => self
                .finding_keys
                .iter()
                .flat_map(|key| [key.clone(), qualified_key(key, NEGATIVE_QUALIFIER)])
                .collect(),
            PromptType::SingleChoice | PromptType::MultiChoice => self
                .finding_keys
                .iter()
                .flat_map(|key| {
                    self.options
                        .iter()
                        .map(move |option| qualified_key(key, &normalize_option(option)))
                })
                .collect(),
            PromptType::NumericScale => self
                .finding_keys
                .iter()
                .flat_map(|key| {
                    ScaleBand::ALL
                        .into_iter()
                        .map(move |band| qualified_key(key, band.as_str()))
                })
                .collect(),
            PromptType::FreeText => Vec::new(),
        }
    }

    /// Normalized option matching `raw`, if any.
    pub fn match_option(&self, raw: &str) -> Option<String> {
        let wanted = normalize_option(raw);
        self.options
            .iter()
            .map(|option| normalize_option(option))
            .find(|option| *option == wanted)
    }
}
