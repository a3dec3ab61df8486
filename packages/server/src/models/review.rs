use chrono::{DateTime, Utc};
use judging::scoring::ScoreEntry;
use serde::Serialize;

use crate::entity::{review, review_score};

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub id: i32,
    pub submission_id: i32,
    pub judge_id: i32,
    /// Normalized 0-100 total.
    pub total_score: f64,
    pub overall_feedback: Option<String>,
    pub flagged: bool,
    /// Send back as `replaces_version` to replace this review.
    pub version: i32,
    pub scores: Vec<ScoreEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReviewListResponse {
    pub submission_id: i32,
    pub average_score: Option<f64>,
    pub data: Vec<ReviewResponse>,
}

pub fn review_response(m: review::Model, scores: Vec<review_score::Model>) -> ReviewResponse {
    ReviewResponse {
        id: m.id,
        submission_id: m.submission_id,
        judge_id: m.judge_id,
        total_score: m.total_score,
        overall_feedback: m.overall_feedback,
        flagged: m.flagged,
        version: m.version,
        scores: scores.into_iter().map(ScoreEntry::from).collect(),
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}
