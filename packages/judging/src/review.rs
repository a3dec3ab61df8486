use serde::{Deserialize, Serialize};

use crate::criteria::JudgingCriterion;
use crate::error::ReviewError;
use crate::scoring::{CriterionScore, RawScore, aggregate, round1};

/// Fraction of a criterion's max score a fresh draft starts at.
const DEFAULT_SCORE_RATIO: f64 = 0.7;

/// Body of `POST /submissions/{id}/scores`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubmitReviewRequest {
    /// One entry per criterion of the hackathon.
    pub criteria: Vec<RawScore>,
    /// Total computed by the client. The server recomputes it and rejects a mismatch.
    #[serde(default)]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub overall_feedback: Option<String>,
    #[serde(default)]
    pub flagged: bool,
    /// Version of the judge's existing review this one replaces.
    #[serde(default)]
    pub replaces_version: Option<i32>,
}

#[derive(Clone, Debug, PartialEq)]
struct DraftScore {
    criterion_id: i32,
    max_score: i32,
    weight: Option<f64>,
    score: Option<f64>,
    feedback: String,
}

/// A judge's in-progress review of one submission.
///
/// Seeded from the hackathon's criteria and kept in sync with them; produces a
/// live total preview and the request body once the judge submits.
#[derive(Clone, Debug, PartialEq)]
pub struct ReviewDraft {
    submission_id: i32,
    scores: Vec<DraftScore>,
    overall_feedback: String,
    flagged: bool,
    replaces_version: Option<i32>,
}

/// Saved copy of a draft, restored when a submit fails.
#[derive(Clone, Debug, PartialEq)]
pub struct DraftSnapshot(ReviewDraft);

impl ReviewDraft {
    /// Start a draft with every criterion at 70% of its max score.
    pub fn initialize(submission_id: i32, criteria: &[JudgingCriterion]) -> Self {
        Self {
            submission_id,
            scores: seed_scores(criteria),
            overall_feedback: String::new(),
            flagged: false,
            replaces_version: None,
        }
    }

    /// Start a draft that will replace the judge's existing review.
    pub fn revising(
        submission_id: i32,
        criteria: &[JudgingCriterion],
        replaces_version: i32,
    ) -> Self {
        Self {
            replaces_version: Some(replaces_version),
            ..Self::initialize(submission_id, criteria)
        }
    }

    pub fn submission_id(&self) -> i32 {
        self.submission_id
    }

    /// Re-seed the scores if the criteria changed identity (ids, scales or weights).
    ///
    /// Returns true when the draft was reset.
    pub fn sync_criteria(&mut self, criteria: &[JudgingCriterion]) -> bool {
        let unchanged = self.scores.len() == criteria.len()
            && self.scores.iter().zip(criteria).all(|(s, c)| {
                s.criterion_id == c.id
                    && s.max_score == c.max_score
                    && s.weight.map(f64::to_bits) == c.weight.map(f64::to_bits)
            });
        if unchanged {
            return false;
        }
        self.scores = seed_scores(criteria);
        true
    }

    pub fn set_score(&mut self, criterion_id: i32, score: f64) -> Result<(), ReviewError> {
        let entry = self.entry_mut(criterion_id)?;
        // Validate against the criterion's own scale before accepting.
        aggregate(&[CriterionScore {
            score,
            max_score: entry.max_score,
            weight: Some(1.0),
        }])?;
        entry.score = Some(score);
        Ok(())
    }

    pub fn clear_score(&mut self, criterion_id: i32) -> Result<(), ReviewError> {
        self.entry_mut(criterion_id)?.score = None;
        Ok(())
    }

    pub fn set_feedback(
        &mut self,
        criterion_id: i32,
        feedback: impl Into<String>,
    ) -> Result<(), ReviewError> {
        self.entry_mut(criterion_id)?.feedback = feedback.into();
        Ok(())
    }

    pub fn set_overall_feedback(&mut self, feedback: impl Into<String>) {
        self.overall_feedback = feedback.into();
    }

    pub fn set_flagged(&mut self, flagged: bool) {
        self.flagged = flagged;
    }

    pub fn score(&self, criterion_id: i32) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.criterion_id == criterion_id)
            .and_then(|s| s.score)
    }

    pub fn scored_count(&self) -> usize {
        self.scores.iter().filter(|s| s.score.is_some()).count()
    }

    pub fn criteria_count(&self) -> usize {
        self.scores.len()
    }

    pub fn is_complete(&self) -> bool {
        self.scored_count() == self.criteria_count()
    }

    /// Live total over the criteria scored so far.
    pub fn preview_total(&self) -> Result<Option<f64>, ReviewError> {
        let scores: Vec<CriterionScore> = self
            .scores
            .iter()
            .filter_map(|s| {
                s.score.map(|score| CriterionScore {
                    score,
                    max_score: s.max_score,
                    weight: s.weight,
                })
            })
            .collect();
        Ok(aggregate(&scores)?)
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot(self.clone())
    }

    pub fn restore(&mut self, snapshot: DraftSnapshot) {
        *self = snapshot.0;
    }

    /// Build the submit body. Every criterion must be scored.
    pub fn to_request(&self) -> Result<SubmitReviewRequest, ReviewError> {
        if !self.is_complete() {
            return Err(ReviewError::Incomplete {
                scored: self.scored_count(),
                total: self.criteria_count(),
            });
        }
        let total_score = self.preview_total()?;
        let criteria = self
            .scores
            .iter()
            .filter_map(|s| {
                s.score.map(|score| RawScore {
                    criterion_id: s.criterion_id,
                    score,
                    feedback: non_empty(&s.feedback),
                })
            })
            .collect();

        Ok(SubmitReviewRequest {
            criteria,
            total_score,
            overall_feedback: non_empty(&self.overall_feedback),
            flagged: self.flagged,
            replaces_version: self.replaces_version,
        })
    }

    fn entry_mut(&mut self, criterion_id: i32) -> Result<&mut DraftScore, ReviewError> {
        self.scores
            .iter_mut()
            .find(|s| s.criterion_id == criterion_id)
            .ok_or(ReviewError::UnknownCriterion(criterion_id))
    }
}

fn seed_scores(criteria: &[JudgingCriterion]) -> Vec<DraftScore> {
    criteria
        .iter()
        .map(|c| DraftScore {
            criterion_id: c.id,
            max_score: c.max_score,
            weight: c.weight,
            score: Some(round1(c.max_score as f64 * DEFAULT_SCORE_RATIO)),
            feedback: String::new(),
        })
        .collect()
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Mean of every judge's total for a submission, on the stored `0..=10` scale.
///
/// Left unrounded so close means still rank apart; see [`display_average`].
pub fn average_score(totals: &[f64]) -> Option<f64> {
    if totals.is_empty() {
        return None;
    }
    let mean = totals.iter().sum::<f64>() / totals.len() as f64;
    Some(mean / 10.0)
}

/// A stored average rounded to two decimals for responses.
pub fn display_average(average: Option<f64>) -> Option<f64> {
    average.map(|avg| (avg * 100.0).round() / 100.0)
}

/// How far judging of a hackathon has progressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct JudgingProgress {
    /// Number of submissions in the hackathon.
    pub total: u64,
    /// Submissions with at least one review.
    pub reviewed: u64,
}

impl JudgingProgress {
    /// Build from the number of reviews each submission has.
    pub fn from_review_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        counts.into_iter().fold(
            Self {
                total: 0,
                reviewed: 0,
            },
            |acc, count| Self {
                total: acc.total + 1,
                reviewed: acc.reviewed + u64::from(count > 0),
            },
        )
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.reviewed as f64 / self.total as f64
        }
    }

    /// Results can only be published once every submission has been reviewed.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.reviewed == self.total
    }
}
