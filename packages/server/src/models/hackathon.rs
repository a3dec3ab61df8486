use chrono::{DateTime, Utc};
use judging::HackathonStatus;
use judging::criteria::JudgingCriterion;
use judging::phase::{Action, Permissions, Schedule, TimelineEntry};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use super::criteria::{CriterionInput, validate_criteria_list};
use super::shared::{Pagination, validate_name, validate_text};
use crate::config::LimitsConfig;
use crate::entity::hackathon;
use crate::error::AppError;

const MAX_TITLE_CHARS: usize = 256;
const MAX_DESCRIPTION_CHARS: usize = 1_000_000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateHackathonRequest {
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub schedule: Schedule,
    #[serde(default)]
    pub judging_criteria: Vec<CriterionInput>,
}

/// PATCH body. `judging_criteria`, when present, replaces the whole list.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateHackathonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<HackathonStatus>,
    pub registration_opens_at: Option<DateTime<Utc>>,
    pub registration_closes_at: Option<DateTime<Utc>>,
    pub hacking_starts_at: Option<DateTime<Utc>>,
    pub hacking_ends_at: Option<DateTime<Utc>>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub judging_ends_at: Option<DateTime<Utc>>,
    pub judging_criteria: Option<Vec<CriterionInput>>,
}

impl UpdateHackathonRequest {
    /// Overlay the schedule fields of this patch on the stored schedule.
    pub fn merge_schedule(&self, existing: Schedule) -> Schedule {
        Schedule {
            registration_opens_at: self
                .registration_opens_at
                .or(existing.registration_opens_at),
            registration_closes_at: self
                .registration_closes_at
                .or(existing.registration_closes_at),
            hacking_starts_at: self.hacking_starts_at.or(existing.hacking_starts_at),
            hacking_ends_at: self.hacking_ends_at.or(existing.hacking_ends_at),
            submission_deadline: self.submission_deadline.or(existing.submission_deadline),
            judging_ends_at: self.judging_ends_at.or(existing.judging_ends_at),
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HackathonListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive title search.
    pub search: Option<String>,
    pub status: Option<HackathonStatus>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: HackathonStatus,
    pub owner_id: i32,
    #[serde(flatten)]
    pub schedule: Schedule,
    pub judging_criteria: Vec<JudgingCriterion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct HackathonListItem {
    pub id: i32,
    pub title: String,
    pub status: HackathonStatus,
    pub owner_id: i32,
    pub hacking_starts_at: Option<DateTime<Utc>>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonListResponse {
    pub data: Vec<HackathonListItem>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DeniedAction {
    pub action: Action,
    pub message: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PhaseResponse {
    pub hackathon_id: i32,
    pub status: HackathonStatus,
    pub permissions: Permissions,
    /// Every action the current phase denies, with the reason.
    pub denied: Vec<DeniedAction>,
    pub timeline: Vec<TimelineEntry>,
}

pub fn schedule_of(m: &hackathon::Model) -> Schedule {
    Schedule {
        registration_opens_at: m.registration_opens_at,
        registration_closes_at: m.registration_closes_at,
        hacking_starts_at: m.hacking_starts_at,
        hacking_ends_at: m.hacking_ends_at,
        submission_deadline: m.submission_deadline,
        judging_ends_at: m.judging_ends_at,
    }
}

pub fn hackathon_response(
    m: hackathon::Model,
    judging_criteria: Vec<JudgingCriterion>,
) -> HackathonResponse {
    HackathonResponse {
        schedule: schedule_of(&m),
        id: m.id,
        title: m.title,
        description: m.description,
        status: m.status,
        owner_id: m.owner_id,
        judging_criteria,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.trim().is_empty() {
        return Err(AppError::Validation(
            "Description must be non-empty and at most 1MB".into(),
        ));
    }
    validate_text(description, "Description", MAX_DESCRIPTION_CHARS)
}

fn validate_schedule(schedule: &Schedule) -> Result<(), AppError> {
    if !schedule.is_ordered() {
        return Err(AppError::Validation(
            "Schedule timestamps must follow the hackathon lifecycle order".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_hackathon(
    req: &CreateHackathonRequest,
    limits: &LimitsConfig,
) -> Result<(), AppError> {
    validate_name(&req.title, "Title", MAX_TITLE_CHARS)?;
    validate_description(&req.description)?;
    validate_schedule(&req.schedule)?;
    validate_criteria_list(&req.judging_criteria, limits.max_criteria)
}

/// Field-level checks; the merged schedule is validated against stored values in the handler.
pub fn validate_update_hackathon(
    req: &UpdateHackathonRequest,
    limits: &LimitsConfig,
) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_name(title, "Title", MAX_TITLE_CHARS)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    if let Some(ref criteria) = req.judging_criteria {
        validate_criteria_list(criteria, limits.max_criteria)?;
    }
    Ok(())
}

pub fn validate_merged_schedule(schedule: &Schedule) -> Result<(), AppError> {
    validate_schedule(schedule)
}
