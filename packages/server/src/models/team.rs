use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::validate_name;
use crate::entity::{team, team_member};
use crate::error::AppError;

const MAX_TEAM_NAME_CHARS: usize = 64;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTeamRequest {
    pub name: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamMemberResponse {
    pub user_id: i32,
    pub username: String,
    pub joined_at: DateTime<Utc>,
}

impl From<team_member::Model> for TeamMemberResponse {
    fn from(m: team_member::Model) -> Self {
        Self {
            user_id: m.user_id,
            username: m.username,
            joined_at: m.joined_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamResponse {
    pub id: i32,
    pub hackathon_id: i32,
    pub name: String,
    pub created_by: i32,
    pub members: Vec<TeamMemberResponse>,
    pub created_at: DateTime<Utc>,
}

pub fn team_response(m: team::Model, members: Vec<team_member::Model>) -> TeamResponse {
    TeamResponse {
        id: m.id,
        hackathon_id: m.hackathon_id,
        name: m.name,
        created_by: m.created_by,
        members: members.into_iter().map(Into::into).collect(),
        created_at: m.created_at,
    }
}

pub fn validate_create_team(req: &CreateTeamRequest) -> Result<(), AppError> {
    validate_name(&req.name, "Team name", MAX_TEAM_NAME_CHARS)
}
