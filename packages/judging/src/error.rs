use thiserror::Error;

/// Errors raised while turning raw judge scores into a total.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("total criteria weight must be greater than zero")]
    NonPositiveTotalWeight,
    #[error("max score must be at least 1 (got {max_score})")]
    InvalidMaxScore { max_score: i32 },
    #[error("criterion weight must not be negative (got {weight})")]
    NegativeWeight { weight: f64 },
    #[error("scores and weights must be finite numbers")]
    NonFinite,
    #[error("score {score} is outside 0..={max_score}")]
    ScoreOutOfRange { score: f64, max_score: i32 },
    #[error("criterion {0} does not belong to this hackathon")]
    UnknownCriterion(i32),
    #[error("criterion {0} was scored more than once")]
    DuplicateCriterion(i32),
    #[error("{} of {total} criteria were not scored", missing.len())]
    MissingCriteria { missing: Vec<i32>, total: usize },
}

/// Errors raised while validating a hackathon's criteria list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CriteriaError {
    #[error("Criterion name must be 1-128 characters")]
    InvalidName,
    #[error("Criterion description must be at most 2000 characters")]
    DescriptionTooLong,
    #[error("Criterion weight must be between 0 and 100")]
    InvalidWeight,
    #[error("Criterion max_score must be at least 1")]
    InvalidMaxScore,
    #[error("Criteria weights must add up to more than zero")]
    ZeroTotalWeight,
    #[error("criterion_ids must not be empty")]
    EmptyReorder,
    #[error("Duplicate criterion_id {0} in reorder list")]
    DuplicateInReorder(i32),
    #[error("Reorder list must contain exactly the current criteria")]
    ReorderMismatch,
}

/// Errors raised by a judge's in-progress review.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReviewError {
    #[error("criterion {0} is not part of this review")]
    UnknownCriterion(i32),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("{scored} of {total} criteria scored; every criterion needs a score")]
    Incomplete { scored: usize, total: usize },
}
