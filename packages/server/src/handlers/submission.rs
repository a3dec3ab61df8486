use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use judging::{Action, SubmissionStatus};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{hackathon, submission, team, team_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::Pagination;
use crate::models::submission::*;
use crate::state::AppState;
use crate::utils::hackathon::{
    check_hackathon_access, find_hackathon, find_hackathon_for_update, find_submission,
    is_accepted_judge, is_manager, require_manager, require_phase,
};
use crate::utils::submission::{is_team_member, review_counts, team_names};

/// Whether the caller may see every submission of a hackathon rather than only their team's.
async fn sees_all_submissions<C: ConnectionTrait>(
    db: &C,
    auth_user: &AuthUser,
    hackathon: &hackathon::Model,
) -> Result<bool, AppError> {
    if is_manager(auth_user, hackathon) {
        return Ok(true);
    }
    is_accepted_judge(db, auth_user, hackathon.id).await
}

#[utoipa::path(
    post,
    path = "/{id}/submissions",
    tag = "Submissions",
    operation_id = "createSubmission",
    summary = "Submit a project",
    description = "Enters a team's project. Only allowed during `hacking` and `submission`, only by a member of the team, and once per team. Requires `submission:create` permission.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission created", body = SubmissionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a team member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon or team not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Team already submitted (CONFLICT) or submissions closed (PHASE_CLOSED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, team_id = payload.team_id))]
pub async fn create_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("submission:create")?;
    validate_create_submission(&payload)?;

    let txn = state.db.begin().await?;
    let hackathon = find_hackathon_for_update(&txn, id).await?;
    check_hackathon_access(&auth_user, &hackathon)?;
    require_phase(&hackathon, Action::SubmitProjects)?;

    let team_model = team::Entity::find_by_id(payload.team_id)
        .filter(team::Column::HackathonId.eq(id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))?;
    if !is_team_member(&txn, team_model.id, auth_user.user_id).await? {
        return Err(AppError::PermissionDenied);
    }

    let already = submission::Entity::find()
        .filter(submission::Column::TeamId.eq(team_model.id))
        .one(&txn)
        .await?;
    if already.is_some() {
        return Err(AppError::Conflict(
            "This team has already submitted a project".into(),
        ));
    }

    let now = chrono::Utc::now();
    let model = submission::ActiveModel {
        hackathon_id: Set(id),
        team_id: Set(team_model.id),
        project_name: Set(payload.project_name.trim().to_string()),
        description: Set(payload.description),
        track: Set(payload.track.trim().to_string()),
        repository_url: Set(payload.repository_url.map(|u| u.trim().to_string())),
        status: Set(SubmissionStatus::Submitted),
        average_score: Set(None),
        submitted_by: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(hackathon_id = id, submission_id = model.id, "Project submitted");
    Ok((
        StatusCode::CREATED,
        Json(submission_response(model, team_model.name, 0)),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/submissions",
    tag = "Submissions",
    operation_id = "listSubmissions",
    summary = "List a hackathon's submissions",
    description = "Returns submissions with their review count and average score, oldest first. Organizers and accepted judges of the hackathon see every submission; everyone else sees their own team's.",
    params(("id" = i32, Path, description = "Hackathon ID"), SubmissionListQuery),
    responses(
        (status = 200, description = "Submissions", body = SubmissionListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(id))]
pub async fn list_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<SubmissionListResponse>, AppError> {
    let hackathon = find_hackathon(&state.db, id).await?;
    check_hackathon_access(&auth_user, &hackathon)?;
    let (page, per_page) = Pagination::clamp(query.page, query.per_page);

    let mut select = submission::Entity::find().filter(submission::Column::HackathonId.eq(id));

    if !sees_all_submissions(&state.db, &auth_user, &hackathon).await? {
        select = select.filter(
            submission::Column::TeamId.in_subquery(
                SeaQuery::select()
                    .column(team_member::Column::TeamId)
                    .from(team_member::Entity)
                    .and_where(team_member::Column::UserId.eq(auth_user.user_id))
                    .and_where(team_member::Column::HackathonId.eq(id))
                    .to_owned(),
            ),
        );
    }
    if let Some(ref track) = query.track {
        select = select.filter(submission::Column::Track.eq(track.trim()));
    }
    if let Some(status) = query.status {
        select = select.filter(submission::Column::Status.eq(status));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let models = select
        .order_by_asc(submission::Column::Id)
        .offset(Some(Pagination::offset(page, per_page)))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = models.iter().map(|s| s.id).collect();
    let team_ids: Vec<i32> = models.iter().map(|s| s.team_id).collect();
    let counts = review_counts(&state.db, &ids).await?;
    let teams = team_names(&state.db, &team_ids).await?;

    let data = models
        .into_iter()
        .map(|s| {
            let team_name = teams.get(&s.team_id).cloned().unwrap_or_default();
            let review_count = counts.get(&s.id).copied().unwrap_or(0);
            submission_response(s, team_name, review_count)
        })
        .collect();

    Ok(Json(SubmissionListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Submissions",
    operation_id = "getSubmission",
    summary = "Get a submission by ID",
    description = "Readable by the hackathon's organizers, its accepted judges, and members of the submitting team; others get 404.",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission details", body = SubmissionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let model = find_submission(&state.db, id).await?;
    let hackathon = find_hackathon(&state.db, model.hackathon_id).await?;
    check_hackathon_access(&auth_user, &hackathon)
        .map_err(|_| AppError::NotFound("Submission not found".into()))?;
    if !sees_all_submissions(&state.db, &auth_user, &hackathon).await?
        && !is_team_member(&state.db, model.team_id, auth_user.user_id).await?
    {
        return Err(AppError::NotFound("Submission not found".into()));
    }

    let counts = review_counts(&state.db, &[model.id]).await?;
    let teams = team_names(&state.db, &[model.team_id]).await?;
    let team_name = teams.get(&model.team_id).cloned().unwrap_or_default();
    let review_count = counts.get(&model.id).copied().unwrap_or(0);
    Ok(Json(submission_response(model, team_name, review_count)))
}

#[utoipa::path(
    patch,
    path = "/{id}/status",
    tag = "Submissions",
    operation_id = "updateSubmissionStatus",
    summary = "Set a submission's status",
    description = "Organizer override of the review status. Any status may be set.",
    params(("id" = i32, Path, description = "Submission ID")),
    request_body = UpdateSubmissionStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = SubmissionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, status = %payload.status))]
pub async fn update_submission_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateSubmissionStatusRequest>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_submission(&txn, id).await?;
    let hackathon = find_hackathon_for_update(&txn, existing.hackathon_id).await?;
    require_manager(&auth_user, &hackathon)?;

    let previous = existing.status;
    let mut active: submission::ActiveModel = existing.into();
    active.status = Set(payload.status);
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;

    let counts = review_counts(&txn, &[model.id]).await?;
    let teams = team_names(&txn, &[model.team_id]).await?;
    txn.commit().await?;

    info!(submission_id = id, from = %previous, to = %model.status, "Submission status changed");
    let team_name = teams.get(&model.team_id).cloned().unwrap_or_default();
    let review_count = counts.get(&model.id).copied().unwrap_or(0);
    Ok(Json(submission_response(model, team_name, review_count)))
}
