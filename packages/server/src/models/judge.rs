use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::validate_name;
use crate::entity::hackathon_judge;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct InviteJudgeRequest {
    /// ID of the user in the external auth service.
    pub user_id: i32,
    pub username: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JudgeResponse {
    pub hackathon_id: i32,
    pub user_id: i32,
    pub username: String,
    pub invited_at: DateTime<Utc>,
    /// `null` while the invitation is pending.
    pub accepted_at: Option<DateTime<Utc>>,
}

impl From<hackathon_judge::Model> for JudgeResponse {
    fn from(m: hackathon_judge::Model) -> Self {
        Self {
            hackathon_id: m.hackathon_id,
            user_id: m.user_id,
            username: m.username,
            invited_at: m.invited_at,
            accepted_at: m.accepted_at,
        }
    }
}

pub fn validate_invite_judge(req: &InviteJudgeRequest) -> Result<(), AppError> {
    if req.user_id <= 0 {
        return Err(AppError::Validation("user_id must be positive".into()));
    }
    validate_name(&req.username, "Username", 64)
}
