use judging::review::JudgingProgress;
use judging::{HackathonStatus, SubmissionStatus};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Rank only the submissions of this track.
    pub track: Option<String>,
}

/// A submission as it appears on the leaderboard.
#[derive(Clone, Serialize, utoipa::ToSchema)]
pub struct LeaderboardSubmission {
    pub submission_id: i32,
    pub project_name: String,
    pub team_name: String,
    pub track: String,
    pub status: SubmissionStatus,
    pub review_count: u64,
    #[serde(skip)]
    pub average_score: Option<f64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    /// Average judge total on the 0-100 display scale.
    pub score: f64,
    #[serde(flatten)]
    pub submission: LeaderboardSubmission,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaderboardResponse {
    pub hackathon_id: i32,
    pub status: HackathonStatus,
    pub track: Option<String>,
    pub entries: Vec<LeaderboardEntry>,
    /// Submissions no judge has reviewed yet. They carry no rank or score.
    pub unscored: Vec<LeaderboardSubmission>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProgressResponse {
    pub hackathon_id: i32,
    pub total: u64,
    pub reviewed: u64,
    /// `reviewed / total`, 0 when there are no submissions.
    pub ratio: f64,
    /// Whether results can be published.
    pub complete: bool,
}

impl ProgressResponse {
    pub fn new(hackathon_id: i32, progress: JudgingProgress) -> Self {
        Self {
            hackathon_id,
            total: progress.total,
            reviewed: progress.reviewed,
            ratio: progress.ratio(),
            complete: progress.is_complete(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PublishResponse {
    pub hackathon_id: i32,
    pub status: HackathonStatus,
    /// IDs of the submissions marked `winner`, best first.
    pub winners: Vec<i32>,
}
