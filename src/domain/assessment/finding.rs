//! Structured findings derived from answers.
//!
//! Findings are stored per category in dedicated fields so that every piece
//! of code that walks categories is forced, by exhaustive matching, to handle
//! all of them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::QuestionId;
use crate::domain::knowledge::{
    qualified_key, FindingCategory, PromptType, QuestionTemplate, ScaleBand, NEGATIVE_QUALIFIER,
    SCALE_MAX,
};

use super::answer::Answer;

/// Interpreted value of a single answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FindingValue {
    Flag(bool),
    Scale(u8),
    /// Normalized option names.
    Choice(Vec<String>),
    Text(String),
    /// The answer did not fit the question's prompt type.
    Unparseable { raw: String, reason: String },
}

impl FindingValue {
    pub fn is_parseable(&self) -> bool {
        !matches!(self, FindingValue::Unparseable { .. })
    }

    /// Text worth scanning for red-flag keywords, if any.
    pub fn scannable_text(&self) -> Option<&str> {
        match self {
            FindingValue::Text(text) => Some(text),
            FindingValue::Unparseable { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// A named clinical datum recorded in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub key: String,
    pub value: FindingValue,
    pub source: QuestionId,
}

impl Finding {
    /// Evidence keys used for likelihood lookup.
    pub fn evidence_keys(&self) -> Vec<String> {
        match &self.value {
            FindingValue::Flag(true) => vec![self.key.clone()],
            FindingValue::Flag(false) => vec![qualified_key(&self.key, NEGATIVE_QUALIFIER)],
            FindingValue::Scale(value) => {
                vec![qualified_key(&self.key, ScaleBand::from_value(*value).as_str())]
            }
            FindingValue::Choice(options) => options
                .iter()
                .map(|option| qualified_key(&self.key, option))
                .collect(),
            FindingValue::Text(_) | FindingValue::Unparseable { .. } => Vec::new(),
        }
    }
}

/// Findings of one category, in the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryFindings {
    findings: Vec<Finding>,
}

impl CategoryFindings {
    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter()
    }

    pub fn get(&self, key: &str) -> Option<&Finding> {
        self.findings.iter().rev().find(|f| f.key == key)
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

/// All findings of a session, one field per category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalFindings {
    pub pain: CategoryFindings,
    pub neurological: CategoryFindings,
    pub range_of_motion: CategoryFindings,
    pub motor: CategoryFindings,
    pub objective: CategoryFindings,
    pub functional: CategoryFindings,
    pub history: CategoryFindings,
}

impl ClinicalFindings {
    pub fn category(&self, category: FindingCategory) -> &CategoryFindings {
        match category {
            FindingCategory::Pain => &self.pain,
            FindingCategory::Neurological => &self.neurological,
            FindingCategory::RangeOfMotion => &self.range_of_motion,
            FindingCategory::Motor => &self.motor,
            FindingCategory::Objective => &self.objective,
            FindingCategory::Functional => &self.functional,
            FindingCategory::History => &self.history,
        }
    }

    fn category_mut(&mut self, category: FindingCategory) -> &mut CategoryFindings {
        match category {
            FindingCategory::Pain => &mut self.pain,
            FindingCategory::Neurological => &mut self.neurological,
            FindingCategory::RangeOfMotion => &mut self.range_of_motion,
            FindingCategory::Motor => &mut self.motor,
            FindingCategory::Objective => &mut self.objective,
            FindingCategory::Functional => &mut self.functional,
            FindingCategory::History => &mut self.history,
        }
    }

    pub fn record(&mut self, category: FindingCategory, finding: Finding) {
        self.category_mut(category).push(finding);
    }

    /// Every finding with the category it is stored under.
    pub fn iter(&self) -> impl Iterator<Item = (FindingCategory, &Finding)> {
        FindingCategory::ALL
            .into_iter()
            .flat_map(move |category| self.category(category).iter().map(move |f| (category, f)))
    }

    /// Union of evidence keys across all categories.
    pub fn evidence_keys(&self) -> BTreeSet<String> {
        self.iter().flat_map(|(_, f)| f.evidence_keys()).collect()
    }

    pub fn len(&self) -> usize {
        FindingCategory::ALL
            .into_iter()
            .map(|category| self.category(category).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Interprets an answer against the question's prompt type.
///
/// Never fails: answers that don't fit become [`FindingValue::Unparseable`].
pub fn interpret(template: &QuestionTemplate, answer: &Answer) -> FindingValue {
    let unparseable = |reason: &str| FindingValue::Unparseable {
        raw: answer.raw(),
        reason: reason.to_string(),
    };

    match template.prompt_type {
        PromptType::YesNo => match answer {
            Answer::Bool(value) => FindingValue::Flag(*value),
            Answer::Number(n) if *n == 1.0 => FindingValue::Flag(true),
            Answer::Number(n) if *n == 0.0 => FindingValue::Flag(false),
            Answer::Text(text) => match parse_yes_no(text) {
                Some(value) => FindingValue::Flag(value),
                None => unparseable("expected yes or no"),
            },
            _ => unparseable("expected yes or no"),
        },
        PromptType::NumericScale => {
            let number = match answer {
                Answer::Number(n) => Some(*n),
                Answer::Text(text) => parse_scale_text(text),
                _ => None,
            };
            match number {
                Some(n) if n.is_finite() && (0.0..=SCALE_MAX as f64).contains(&n) => {
                    FindingValue::Scale(n.round() as u8)
                }
                Some(_) => unparseable("scale value out of range 0-10"),
                None => unparseable("expected a number from 0 to 10"),
            }
        }
        PromptType::SingleChoice => {
            let raw = match answer {
                Answer::Text(text) => Some(text.as_str()),
                Answer::Choices(values) if values.len() == 1 => Some(values[0].as_str()),
                _ => None,
            };
            match raw.and_then(|raw| template.match_option(raw)) {
                Some(option) => FindingValue::Choice(vec![option]),
                None => unparseable("not one of the offered options"),
            }
        }
        PromptType::MultiChoice => {
            let raw: Vec<&str> = match answer {
                Answer::Choices(values) => values.iter().map(String::as_str).collect(),
                Answer::Text(text) => text.split(',').collect(),
                _ => return unparseable("expected a list of options"),
            };
            let mut selected: Vec<String> = Vec::new();
            for entry in raw.into_iter().filter(|e| !e.trim().is_empty()) {
                match template.match_option(entry) {
                    Some(option) if !selected.contains(&option) => selected.push(option),
                    Some(_) => {}
                    None => return unparseable("not one of the offered options"),
                }
            }
            if selected.is_empty() {
                unparseable("no option selected")
            } else {
                FindingValue::Choice(selected)
            }
        }
        PromptType::FreeText => {
            let text = answer.raw();
            if text.trim().is_empty() {
                unparseable("empty answer")
            } else {
                FindingValue::Text(text.trim().to_string())
            }
        }
    }
}

/// Findings produced by one answer, one per storage key of the question.
pub fn derive_findings(template: &QuestionTemplate, value: &FindingValue) -> Vec<Finding> {
    template
        .storage_keys()
        .into_iter()
        .map(|key| Finding {
            key,
            value: value.clone(),
            source: template.id.clone(),
        })
        .collect()
}

fn parse_yes_no(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_scale_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix("/10").unwrap_or(trimmed).trim();
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge::QuestionCategory;

    fn template(prompt_type: PromptType) -> QuestionTemplate {
        QuestionTemplate {
            id: QuestionId::new("q").unwrap(),
            prompt: "?".to_string(),
            category: QuestionCategory::Pain,
            prompt_type,
            options: vec!["Sitting".to_string(), "Bending forward".to_string()],
            finding_keys: vec!["aggravator".to_string()],
            finding_category: FindingCategory::Pain,
            topic: None,
            priority: 1.0,
            discriminative_hint: 0,
            red_flag: false,
        }
    }

    mod interpretation {
        use super::*;

        #[test]
        fn yes_no_accepts_bool_and_text() {
            let q = template(PromptType::YesNo);
            assert_eq!(interpret(&q, &Answer::Bool(true)), FindingValue::Flag(true));
            assert_eq!(interpret(&q, &Answer::text(" Yes ")), FindingValue::Flag(true));
            assert_eq!(interpret(&q, &Answer::text("n")), FindingValue::Flag(false));
            assert!(!interpret(&q, &Answer::text("sometimes")).is_parseable());
        }

        #[test]
        fn scale_accepts_numbers_in_range() {
            let q = template(PromptType::NumericScale);
            assert_eq!(interpret(&q, &Answer::Number(7.0)), FindingValue::Scale(7));
            assert_eq!(interpret(&q, &Answer::text("4/10")), FindingValue::Scale(4));
            assert!(!interpret(&q, &Answer::Number(11.0)).is_parseable());
            assert!(!interpret(&q, &Answer::Number(-1.0)).is_parseable());
            assert!(!interpret(&q, &Answer::text("a lot")).is_parseable());
        }

        #[test]
        fn single_choice_normalizes_option() {
            let q = template(PromptType::SingleChoice);
            assert_eq!(
                interpret(&q, &Answer::text("bending FORWARD")),
                FindingValue::Choice(vec!["bending_forward".to_string()])
            );
            assert!(!interpret(&q, &Answer::text("lying down")).is_parseable());
        }

        #[test]
        fn multi_choice_accepts_list_or_comma_text() {
            let q = template(PromptType::MultiChoice);
            let expected = FindingValue::Choice(vec![
                "sitting".to_string(),
                "bending_forward".to_string(),
            ]);
            assert_eq!(interpret(&q, &Answer::choices(["Sitting", "Bending forward"])), expected);
            assert_eq!(interpret(&q, &Answer::text("sitting, bending forward")), expected);
        }

        #[test]
        fn multi_choice_rejects_any_unknown_option() {
            let q = template(PromptType::MultiChoice);
            assert!(!interpret(&q, &Answer::choices(["sitting", "running"])).is_parseable());
        }

        #[test]
        fn free_text_rejects_blank() {
            let q = template(PromptType::FreeText);
            assert_eq!(
                interpret(&q, &Answer::text("  sharp pain  ")),
                FindingValue::Text("sharp pain".to_string())
            );
            assert!(!interpret(&q, &Answer::text("   ")).is_parseable());
        }
    }

    mod evidence {
        use super::*;

        fn finding(value: FindingValue) -> Finding {
            Finding {
                key: "pain_level".to_string(),
                value,
                source: QuestionId::new("q").unwrap(),
            }
        }

        #[test]
        fn flag_true_yields_bare_key() {
            assert_eq!(finding(FindingValue::Flag(true)).evidence_keys(), vec!["pain_level"]);
        }

        #[test]
        fn flag_false_yields_negative_key() {
            assert_eq!(
                finding(FindingValue::Flag(false)).evidence_keys(),
                vec!["pain_level:no"]
            );
        }

        #[test]
        fn scale_yields_band_key() {
            assert_eq!(
                finding(FindingValue::Scale(8)).evidence_keys(),
                vec!["pain_level:severe"]
            );
        }

        #[test]
        fn unparseable_yields_nothing() {
            let value = FindingValue::Unparseable {
                raw: "?".to_string(),
                reason: "x".to_string(),
            };
            assert!(finding(value).evidence_keys().is_empty());
        }
    }

    #[test]
    fn findings_are_stored_per_category() {
        let q = template(PromptType::YesNo);
        let mut findings = ClinicalFindings::default();
        for f in derive_findings(&q, &FindingValue::Flag(true)) {
            findings.record(FindingCategory::Neurological, f);
        }

        assert_eq!(findings.neurological.len(), 1);
        assert!(findings.pain.is_empty());
        assert_eq!(findings.len(), 1);
        assert!(findings.evidence_keys().contains("aggravator"));
        assert!(findings.neurological.get("aggravator").is_some());
    }
}
