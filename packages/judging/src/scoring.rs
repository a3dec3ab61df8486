//! Weighted multi-criteria score aggregation.
//!
//! Every criterion contributes `(score / max_score) * weight`; the sum is
//! divided by the total weight and scaled to `0..=100`, rounded to one decimal.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::criteria::{JudgingCriterion, effective_weight};
use crate::error::ScoringError;

/// One judge's raw score for one criterion, together with the criterion's
/// scale and weight at the time of scoring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CriterionScore {
    pub score: f64,
    pub max_score: i32,
    pub weight: Option<f64>,
}

/// A raw score as sent by a judge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RawScore {
    pub criterion_id: i32,
    pub score: f64,
    pub feedback: Option<String>,
}

/// A raw score joined with the criterion it was given against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ScoreEntry {
    pub criterion_id: i32,
    pub score: f64,
    pub max_score: i32,
    pub weight: Option<f64>,
    pub feedback: Option<String>,
}

impl ScoreEntry {
    pub fn as_criterion_score(&self) -> CriterionScore {
        CriterionScore {
            score: self.score,
            max_score: self.max_score,
            weight: self.weight,
        }
    }
}

/// The validated, ordered result of scoring a submission against a criteria set.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreSheet {
    pub entries: Vec<ScoreEntry>,
    /// `None` when there was nothing to score.
    pub total: Option<f64>,
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute the normalized `0..=100` total of a set of criterion scores.
///
/// Returns `Ok(None)` for an empty set: a submission without criteria is
/// unscored, not zero.
pub fn aggregate(entries: &[CriterionScore]) -> Result<Option<f64>, ScoringError> {
    if entries.is_empty() {
        return Ok(None);
    }

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for entry in entries {
        if entry.max_score < 1 {
            return Err(ScoringError::InvalidMaxScore {
                max_score: entry.max_score,
            });
        }
        let weight = effective_weight(entry.weight);
        if !weight.is_finite() || !entry.score.is_finite() {
            return Err(ScoringError::NonFinite);
        }
        if weight < 0.0 {
            return Err(ScoringError::NegativeWeight { weight });
        }
        if entry.score < 0.0 || entry.score > entry.max_score as f64 {
            return Err(ScoringError::ScoreOutOfRange {
                score: entry.score,
                max_score: entry.max_score,
            });
        }

        weighted_sum += (entry.score / entry.max_score as f64) * weight;
        total_weight += weight;
    }

    if !weighted_sum.is_finite() || !total_weight.is_finite() {
        return Err(ScoringError::NonFinite);
    }
    if total_weight <= 0.0 {
        return Err(ScoringError::NonPositiveTotalWeight);
    }

    let total = round1(weighted_sum / total_weight * 100.0);
    Ok(Some(total.clamp(0.0, 100.0)))
}

/// Join a judge's raw scores to the hackathon's criteria and aggregate them.
///
/// Entries come back in criteria order. With `require_all`, every criterion
/// must be scored exactly once.
pub fn score_sheet(
    criteria: &[JudgingCriterion],
    raw: &[RawScore],
    require_all: bool,
) -> Result<ScoreSheet, ScoringError> {
    let mut by_criterion: HashMap<i32, &RawScore> = HashMap::with_capacity(raw.len());
    for score in raw {
        if !criteria.iter().any(|c| c.id == score.criterion_id) {
            return Err(ScoringError::UnknownCriterion(score.criterion_id));
        }
        if by_criterion.insert(score.criterion_id, score).is_some() {
            return Err(ScoringError::DuplicateCriterion(score.criterion_id));
        }
    }

    if require_all {
        let missing: Vec<i32> = criteria
            .iter()
            .filter(|c| !by_criterion.contains_key(&c.id))
            .map(|c| c.id)
            .collect();
        if !missing.is_empty() {
            return Err(ScoringError::MissingCriteria {
                missing,
                total: criteria.len(),
            });
        }
    }

    let entries: Vec<ScoreEntry> = criteria
        .iter()
        .filter_map(|c| {
            by_criterion.get(&c.id).map(|raw| ScoreEntry {
                criterion_id: c.id,
                score: raw.score,
                max_score: c.max_score,
                weight: c.weight,
                feedback: raw
                    .feedback
                    .as_deref()
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string),
            })
        })
        .collect();

    let scores: Vec<CriterionScore> = entries
        .iter()
        .map(ScoreEntry::as_criterion_score)
        .collect();
    let total = aggregate(&scores)?;

    Ok(ScoreSheet { entries, total })
}
