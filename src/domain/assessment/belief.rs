//! Belief Engine - posterior probabilities over the condition catalog.
//!
//! Pure functions over the knowledge base and the session's findings.
//! Updates never fail: lookup misses are neutral and numeric collapse falls
//! back to the priors with a low-confidence status.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::foundation::ConditionId;
use crate::domain::knowledge::KnowledgeBase;

use super::finding::ClinicalFindings;

/// Quality of the current posterior distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BeliefStatus {
    /// No evidence yet; posteriors equal the normalized priors.
    #[default]
    InsufficientData,
    /// Posteriors reflect the recorded evidence.
    Updated,
    /// Evidence collapsed every score; posteriors fell back to priors.
    LowConfidence,
}

/// Result of a belief update.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefUpdate {
    pub posteriors: BTreeMap<ConditionId, f64>,
    pub status: BeliefStatus,
}

/// Stateless Bayesian-style scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeliefEngine;

impl BeliefEngine {
    /// Normalized priors, or a uniform distribution if they are degenerate.
    pub fn prior_beliefs(kb: &KnowledgeBase) -> BTreeMap<ConditionId, f64> {
        let priors: BTreeMap<ConditionId, f64> = kb
            .conditions()
            .iter()
            .map(|c| (c.id.clone(), sanitize(c.prior)))
            .collect();
        normalize(priors).unwrap_or_else(|| uniform(kb))
    }

    /// Recomputes posteriors from scratch for the given findings.
    ///
    /// Any parseable finding counts as data, even one whose evidence keys
    /// carry no weight in the catalog.
    pub fn update_beliefs(kb: &KnowledgeBase, findings: &ClinicalFindings) -> BeliefUpdate {
        let evidence = findings.evidence_keys();
        let mut update = Self::update_from_evidence(kb, &evidence);
        if update.status == BeliefStatus::InsufficientData
            && findings.iter().any(|(_, finding)| finding.value.is_parseable())
        {
            update.status = BeliefStatus::Updated;
        }
        update
    }

    /// Recomputes posteriors for an explicit set of evidence keys.
    pub fn update_from_evidence(kb: &KnowledgeBase, evidence: &BTreeSet<String>) -> BeliefUpdate {
        let priors = Self::prior_beliefs(kb);
        if evidence.is_empty() {
            return BeliefUpdate {
                posteriors: priors,
                status: BeliefStatus::InsufficientData,
            };
        }

        let mut scores = priors.clone();
        for key in evidence {
            for condition in kb.conditions() {
                if let Some(score) = scores.get_mut(&condition.id) {
                    *score *= condition.likelihood(key);
                }
            }
            // Renormalizing per key keeps long evidence chains from underflowing.
            match normalize(scores.clone()) {
                Some(normalized) => scores = normalized,
                None => return collapsed(priors, evidence.len()),
            }
        }

        for rule in kb.decision_rules() {
            if rule.is_satisfied(evidence) {
                if let Some(score) = scores.get_mut(&rule.condition_id) {
                    *score *= rule.effective_weight();
                }
            }
        }

        match normalize(scores) {
            Some(posteriors) => BeliefUpdate {
                posteriors,
                status: BeliefStatus::Updated,
            },
            None => collapsed(priors, evidence.len()),
        }
    }

    /// Conditions ordered by descending posterior, ties by id.
    pub fn rank(posteriors: &BTreeMap<ConditionId, f64>) -> Vec<(ConditionId, f64)> {
        let mut ranked: Vec<(ConditionId, f64)> =
            posteriors.iter().map(|(id, p)| (id.clone(), *p)).collect();
        ranked.sort_by(|(a_id, a), (b_id, b)| {
            b.partial_cmp(a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a_id.cmp(b_id))
        });
        ranked
    }

    /// The `k` most probable conditions.
    pub fn top_k(posteriors: &BTreeMap<ConditionId, f64>, k: usize) -> Vec<(ConditionId, f64)> {
        let mut ranked = Self::rank(posteriors);
        ranked.truncate(k);
        ranked
    }
}

fn collapsed(priors: BTreeMap<ConditionId, f64>, evidence_count: usize) -> BeliefUpdate {
    tracing::warn!(
        evidence_count,
        "Posterior scores collapsed, falling back to priors"
    );
    BeliefUpdate {
        posteriors: priors,
        status: BeliefStatus::LowConfidence,
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

fn normalize(mut scores: BTreeMap<ConditionId, f64>) -> Option<BTreeMap<ConditionId, f64>> {
    let total: f64 = scores.values().sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }
    for score in scores.values_mut() {
        *score /= total;
    }
    Some(scores)
}

fn uniform(kb: &KnowledgeBase) -> BTreeMap<ConditionId, f64> {
    let share = 1.0 / kb.conditions().len().max(1) as f64;
    kb.conditions()
        .iter()
        .map(|c| (c.id.clone(), share))
        .collect()
}
