//! Question Selector - deterministic choice of the next question.
//!
//! Ordering rules, applied to unanswered questions only:
//!
//! 1. Red-flag questions whose category is implicated by the session so far
//! 2. Discriminative spread of likelihoods across the top-K conditions
//! 3. Fixed topic order, used before any answer and when nothing separates
//!    the leading conditions

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::domain::knowledge::{KnowledgeBase, QuestionCategory, QuestionTemplate};

use super::belief::BeliefEngine;
use super::session::AssessmentSession;

/// Tunables for question selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Number of leading conditions considered for discriminative spread.
    pub top_k: usize,
    /// Spreads at or below this are treated as no signal.
    pub min_spread: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_spread: 1e-9,
        }
    }
}

/// Why a question was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SelectionReason {
    RedFlagPriority,
    Discriminative { spread: f64 },
    FallbackOrder,
}

/// A selected question and the rule that selected it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection<'a> {
    pub question: &'a QuestionTemplate,
    pub reason: SelectionReason,
}

/// Deterministic local selector.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionSelector {
    config: SelectorConfig,
}

impl QuestionSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Next question to ask, or `None` when every question is answered.
    pub fn select_next<'a>(
        &self,
        kb: &'a KnowledgeBase,
        session: &AssessmentSession,
    ) -> Option<Selection<'a>> {
        self.rank(kb, session).into_iter().next()
    }

    /// Up to `n` upcoming questions in selection order.
    pub fn select_batch<'a>(
        &self,
        kb: &'a KnowledgeBase,
        session: &AssessmentSession,
        n: usize,
    ) -> Vec<Selection<'a>> {
        let mut ranked = self.rank(kb, session);
        ranked.truncate(n);
        ranked
    }

    /// Highest-priority rule-1 question, if any.
    ///
    /// Applied before any external recommendation is considered.
    pub fn safety_priority<'a>(
        &self,
        kb: &'a KnowledgeBase,
        session: &AssessmentSession,
    ) -> Option<&'a QuestionTemplate> {
        let implicated = self.implicated_categories(kb, session);
        let mut candidates: Vec<&QuestionTemplate> = kb
            .questions()
            .iter()
            .filter(|q| !session.has_answered(&q.id))
            .filter(|q| q.red_flag && implicated.contains(&q.category))
            .collect();
        candidates.sort_by(|a, b| fallback_order(a, b));
        candidates.into_iter().next()
    }

    /// Every unanswered question, ordered by the three rules.
    pub fn rank<'a>(&self, kb: &'a KnowledgeBase, session: &AssessmentSession) -> Vec<Selection<'a>> {
        let implicated = self.implicated_categories(kb, session);
        let (mut safety, rest): (Vec<&QuestionTemplate>, Vec<&QuestionTemplate>) = kb
            .questions()
            .iter()
            .filter(|q| !session.has_answered(&q.id))
            .partition(|q| q.red_flag && implicated.contains(&q.category));
        safety.sort_by(|a, b| fallback_order(a, b));

        let mut discriminative: Vec<(&QuestionTemplate, f64)> = Vec::new();
        let mut fallback: Vec<&QuestionTemplate> = Vec::new();

        if session.answered_count() == 0 {
            fallback = rest;
        } else {
            let leaders: Vec<_> = BeliefEngine::top_k(session.posteriors(), self.config.top_k)
                .into_iter()
                .filter_map(|(id, _)| kb.condition(&id))
                .collect();

            for question in rest {
                let spread = question
                    .candidate_evidence_keys()
                    .iter()
                    .map(|key| {
                        let weights = leaders.iter().map(|c| c.likelihood(key));
                        let max = weights.clone().fold(f64::NEG_INFINITY, f64::max);
                        let min = weights.fold(f64::INFINITY, f64::min);
                        max - min
                    })
                    .filter(|s| s.is_finite())
                    .fold(0.0, f64::max);

                if spread > self.config.min_spread {
                    discriminative.push((question, spread));
                } else {
                    fallback.push(question);
                }
            }
        }

        discriminative.sort_by(|(a, sa), (b, sb)| {
            sb.total_cmp(sa)
                .then_with(|| b.priority.total_cmp(&a.priority))
                .then_with(|| b.discriminative_hint.cmp(&a.discriminative_hint))
                .then_with(|| a.id.cmp(&b.id))
        });
        fallback.sort_by(|a, b| fallback_order(a, b));

        safety
            .into_iter()
            .map(|question| Selection {
                question,
                reason: SelectionReason::RedFlagPriority,
            })
            .chain(discriminative.into_iter().map(|(question, spread)| Selection {
                question,
                reason: SelectionReason::Discriminative { spread },
            }))
            .chain(fallback.into_iter().map(|question| Selection {
                question,
                reason: SelectionReason::FallbackOrder,
            }))
            .collect()
    }

    /// Categories in which an unanswered red-flag question must be asked
    /// before anything else.
    ///
    /// A category is implicated once a question in it has been answered,
    /// once a detected flag belongs to it, or when one of the leading
    /// conditions is associated with a red flag of that category.
    fn implicated_categories(
        &self,
        kb: &KnowledgeBase,
        session: &AssessmentSession,
    ) -> BTreeSet<QuestionCategory> {
        let mut implicated: BTreeSet<QuestionCategory> =
            session.responses().values().map(|r| r.category).collect();
        implicated.extend(session.red_flags().iter().map(|f| f.category));

        if session.answered_count() > 0 {
            for (id, _) in BeliefEngine::top_k(session.posteriors(), self.config.top_k) {
                let Some(condition) = kb.condition(&id) else {
                    continue;
                };
                implicated.extend(
                    condition
                        .red_flags
                        .iter()
                        .filter_map(|flag| kb.red_flag(flag))
                        .map(|flag| flag.pattern().category),
                );
            }
        }
        implicated
    }
}

/// Topic order, then higher priority, then id. Untagged topics go last.
fn fallback_order(a: &QuestionTemplate, b: &QuestionTemplate) -> Ordering {
    let rank = |q: &QuestionTemplate| q.topic.map(|t| t.rank()).unwrap_or(usize::MAX);
    rank(a)
        .cmp(&rank(b))
        .then_with(|| b.priority.total_cmp(&a.priority))
        .then_with(|| a.id.cmp(&b.id))
}
