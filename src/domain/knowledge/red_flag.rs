//! Red-flag patterns: safety-critical findings that force referral.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::RedFlagId;

use super::category::QuestionCategory;
use super::catalog::CatalogError;

/// Urgency of a red flag. Ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyLevel {
    Low,
    Moderate,
    High,
    Urgent,
}

impl UrgencyLevel {
    /// HIGH and URGENT flags end the dialogue with a referral.
    pub fn requires_referral(&self) -> bool {
        *self >= UrgencyLevel::High
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UrgencyLevel::Low => "LOW",
            UrgencyLevel::Moderate => "MODERATE",
            UrgencyLevel::High => "HIGH",
            UrgencyLevel::Urgent => "URGENT",
        };
        f.write_str(s)
    }
}

/// What makes a red flag fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RedFlagTrigger {
    /// Case-insensitive substring match on free text.
    Keywords { keywords: Vec<String> },
    /// Case-insensitive regex match on free text.
    Pattern { regex: String },
    /// A "yes" to a red-flag question targeting this finding key.
    Finding { finding_key: String },
}

/// A red-flag pattern as authored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlagPattern {
    pub id: RedFlagId,
    pub name: String,
    pub category: QuestionCategory,
    pub trigger: RedFlagTrigger,
    pub urgency: UrgencyLevel,
    #[serde(default)]
    pub message: Option<String>,
}

impl RedFlagPattern {
    /// Message shown to the clinician when this flag fires.
    pub fn referral_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| format!("{} reported", self.name))
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Keywords(Vec<String>),
    Pattern(Regex),
    Finding(String),
}

/// A red-flag pattern with its trigger compiled for matching.
#[derive(Debug, Clone)]
pub struct CompiledRedFlag {
    pattern: RedFlagPattern,
    matcher: Matcher,
}

impl CompiledRedFlag {
    /// Compiles the trigger, rejecting empty keyword sets and bad regexes.
    pub fn compile(pattern: RedFlagPattern) -> Result<Self, CatalogError> {
        let matcher = match &pattern.trigger {
            RedFlagTrigger::Keywords { keywords } => {
                let keywords: Vec<String> = keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                if keywords.is_empty() {
                    return Err(CatalogError::InvalidPattern {
                        id: pattern.id.to_string(),
                        reason: "keyword trigger has no keywords".to_string(),
                    });
                }
                Matcher::Keywords(keywords)
            }
            RedFlagTrigger::Pattern { regex } => {
                let compiled = RegexBuilder::new(regex)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| CatalogError::InvalidPattern {
                        id: pattern.id.to_string(),
                        reason: e.to_string(),
                    })?;
                Matcher::Pattern(compiled)
            }
            RedFlagTrigger::Finding { finding_key } => Matcher::Finding(finding_key.clone()),
        };

        Ok(Self { pattern, matcher })
    }

    pub fn pattern(&self) -> &RedFlagPattern {
        &self.pattern
    }

    pub fn id(&self) -> &RedFlagId {
        &self.pattern.id
    }

    /// Returns true if the free text triggers this flag.
    pub fn matches_text(&self, text: &str) -> bool {
        match &self.matcher {
            Matcher::Keywords(keywords) => {
                let lowered = text.to_lowercase();
                keywords.iter().any(|k| lowered.contains(k.as_str()))
            }
            Matcher::Pattern(regex) => regex.is_match(text),
            Matcher::Finding(_) => false,
        }
    }

    /// Returns true if a "yes" on this finding key triggers this flag.
    pub fn matches_finding(&self, finding_key: &str) -> bool {
        matches!(&self.matcher, Matcher::Finding(key) if key == finding_key)
    }

    /// Finding key this flag is bound to, if it is a direct finding trigger.
    pub fn finding_key(&self) -> Option<&str> {
        match &self.matcher {
            Matcher::Finding(key) => Some(key.as_str()),
            _ => None,
        }
    }
}
