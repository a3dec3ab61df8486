use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CriteriaError;

/// Max score used when an organizer does not pick one.
pub const DEFAULT_MAX_SCORE: i32 = 10;

/// Effective weight of a criterion whose weight was left undefined.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Weights are percentages; a single criterion can carry at most all of it.
pub const MAX_WEIGHT: f64 = 100.0;

const MAX_NAME_CHARS: usize = 128;
const MAX_DESCRIPTION_CHARS: usize = 2000;

/// A named, weighted judging dimension attached to a hackathon.
///
/// `weight` is a percentage. Weights of a hackathon typically add up to 100
/// but are not required to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct JudgingCriterion {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub weight: Option<f64>,
    pub max_score: i32,
}

pub fn effective_weight(weight: Option<f64>) -> f64 {
    weight.unwrap_or(DEFAULT_WEIGHT)
}

/// Validate the fields of a single criterion.
pub fn validate_criterion(
    name: &str,
    description: &str,
    weight: Option<f64>,
    max_score: i32,
) -> Result<(), CriteriaError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
        return Err(CriteriaError::InvalidName);
    }
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(CriteriaError::DescriptionTooLong);
    }
    if let Some(weight) = weight
        && !(0.0..=MAX_WEIGHT).contains(&weight)
    {
        return Err(CriteriaError::InvalidWeight);
    }
    if max_score < 1 {
        return Err(CriteriaError::InvalidMaxScore);
    }
    Ok(())
}

/// Check that a non-empty criteria set can actually be scored.
///
/// An empty set is allowed (submissions simply stay unscored).
pub fn validate_total_weight<I>(weights: I) -> Result<(), CriteriaError>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut count = 0usize;
    let mut total = 0.0;
    for weight in weights {
        count += 1;
        total += effective_weight(weight);
    }
    if count > 0 && total <= 0.0 {
        return Err(CriteriaError::ZeroTotalWeight);
    }
    Ok(())
}

/// Validate a reorder request against the ids currently stored.
///
/// The requested list must be a permutation of `current`.
pub fn validate_reorder(current: &[i32], requested: &[i32]) -> Result<(), CriteriaError> {
    if requested.is_empty() {
        return Err(CriteriaError::EmptyReorder);
    }
    let mut seen = HashSet::new();
    for &id in requested {
        if !seen.insert(id) {
            return Err(CriteriaError::DuplicateInReorder(id));
        }
    }
    let current: HashSet<i32> = current.iter().copied().collect();
    if seen != current {
        return Err(CriteriaError::ReorderMismatch);
    }
    Ok(())
}
