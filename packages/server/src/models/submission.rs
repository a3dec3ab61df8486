use chrono::{DateTime, Utc};
use judging::SubmissionStatus;
use judging::review::display_average;
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_name, validate_text};
use crate::entity::submission;
use crate::error::AppError;

const MAX_PROJECT_NAME_CHARS: usize = 128;
const MAX_TRACK_CHARS: usize = 64;
const MAX_DESCRIPTION_CHARS: usize = 20_000;
const MAX_URL_CHARS: usize = 2048;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubmissionRequest {
    pub team_id: i32,
    pub project_name: String,
    #[serde(default)]
    pub description: String,
    pub track: String,
    pub repository_url: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateSubmissionStatusRequest {
    pub status: SubmissionStatus,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubmissionListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Only submissions entered into this track.
    pub track: Option<String>,
    pub status: Option<SubmissionStatus>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    pub id: i32,
    pub hackathon_id: i32,
    pub team_id: i32,
    pub team_name: String,
    pub project_name: String,
    pub description: String,
    pub track: String,
    pub repository_url: Option<String>,
    pub status: SubmissionStatus,
    /// Mean of the judges' totals on a 0-10 scale; `null` until reviewed.
    pub average_score: Option<f64>,
    pub review_count: u64,
    pub submitted_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionListResponse {
    pub data: Vec<SubmissionResponse>,
    pub pagination: Pagination,
}

pub fn submission_response(
    m: submission::Model,
    team_name: String,
    review_count: u64,
) -> SubmissionResponse {
    SubmissionResponse {
        id: m.id,
        hackathon_id: m.hackathon_id,
        team_id: m.team_id,
        team_name,
        project_name: m.project_name,
        description: m.description,
        track: m.track,
        repository_url: m.repository_url,
        status: m.status,
        average_score: display_average(m.average_score),
        review_count,
        submitted_by: m.submitted_by,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

pub fn validate_create_submission(req: &CreateSubmissionRequest) -> Result<(), AppError> {
    validate_name(&req.project_name, "Project name", MAX_PROJECT_NAME_CHARS)?;
    validate_name(&req.track, "Track", MAX_TRACK_CHARS)?;
    validate_text(&req.description, "Description", MAX_DESCRIPTION_CHARS)?;
    if let Some(ref url) = req.repository_url {
        let url = url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(AppError::Validation(
                "repository_url must be an http(s) URL".into(),
            ));
        }
        validate_text(url, "repository_url", MAX_URL_CHARS)?;
    }
    Ok(())
}
