use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use judging::leaderboard::rank;
use judging::phase::timeline;
use judging::review::JudgingProgress;
use judging::scoring::round1;
use judging::{Action, HackathonStatus, PhaseGate, SubmissionStatus};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::{info, instrument};

use super::criteria::replace_criteria;
use crate::entity::{hackathon, submission};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::hackathon::*;
use crate::models::results::*;
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;
use crate::utils::hackathon::{
    check_hackathon_access, find_hackathon, find_hackathon_for_update, is_accepted_judge,
    is_manager, load_criteria, require_criteria_editable, require_manager, require_phase,
};
use crate::utils::submission::{review_counts, team_names};

#[utoipa::path(
    post,
    path = "/",
    tag = "Hackathons",
    operation_id = "createHackathon",
    summary = "Create a new hackathon",
    description = "Creates a hackathon in `draft` status owned by the caller, optionally with its judging criteria. Requires `hackathon:create` permission.",
    request_body = CreateHackathonRequest,
    responses(
        (status = 201, description = "Hackathon created", body = HackathonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 402, description = "Criteria limit reached (PLAN_LIMIT_REACHED)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateHackathonRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("hackathon:create")?;
    validate_create_hackathon(&payload, &state.config.limits)?;

    let now = chrono::Utc::now();
    let schedule = payload.schedule;
    let txn = state.db.begin().await?;

    let model = hackathon::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        status: Set(HackathonStatus::Draft),
        owner_id: Set(auth_user.user_id),
        registration_opens_at: Set(schedule.registration_opens_at),
        registration_closes_at: Set(schedule.registration_closes_at),
        hacking_starts_at: Set(schedule.hacking_starts_at),
        hacking_ends_at: Set(schedule.hacking_ends_at),
        submission_deadline: Set(schedule.submission_deadline),
        judging_ends_at: Set(schedule.judging_ends_at),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    replace_criteria(&txn, model.id, &payload.judging_criteria).await?;
    let criteria = load_criteria(&txn, model.id).await?;
    txn.commit().await?;

    info!(hackathon_id = model.id, owner_id = auth_user.user_id, "Hackathon created");
    Ok((StatusCode::CREATED, Json(hackathon_response(model, criteria))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Hackathons",
    operation_id = "listHackathons",
    summary = "List hackathons with pagination and search",
    description = "Returns a paginated list of hackathons, newest first. Drafts are only listed for their owner or callers with `hackathon:manage_any`.",
    params(HackathonListQuery),
    responses(
        (status = 200, description = "List of hackathons", body = HackathonListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_hackathons(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<HackathonListQuery>,
) -> Result<Json<HackathonListResponse>, AppError> {
    let (page, per_page) = Pagination::clamp(query.page, query.per_page);

    let mut select = hackathon::Entity::find();

    if !auth_user.has_permission("hackathon:manage_any") {
        select = select.filter(
            Condition::any()
                .add(hackathon::Column::Status.ne(HackathonStatus::Draft))
                .add(hackathon::Column::OwnerId.eq(auth_user.user_id)),
        );
    }

    if let Some(status) = query.status {
        select = select.filter(hackathon::Column::Status.eq(status));
    }

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(hackathon::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let data = select
        .order_by_desc(hackathon::Column::CreatedAt)
        .order_by_desc(hackathon::Column::Id)
        .select_only()
        .column(hackathon::Column::Id)
        .column(hackathon::Column::Title)
        .column(hackathon::Column::Status)
        .column(hackathon::Column::OwnerId)
        .column(hackathon::Column::HackingStartsAt)
        .column(hackathon::Column::SubmissionDeadline)
        .column(hackathon::Column::CreatedAt)
        .column(hackathon::Column::UpdatedAt)
        .offset(Some(Pagination::offset(page, per_page)))
        .limit(Some(per_page))
        .into_model::<HackathonListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(HackathonListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Hackathons",
    operation_id = "getHackathon",
    summary = "Get a hackathon by ID",
    description = "Returns the hackathon with its lifecycle timestamps and judging criteria. Drafts return 404 to everyone except their organizers.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Hackathon details", body = HackathonResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<HackathonResponse>, AppError> {
    let model = find_hackathon(&state.db, id).await?;
    check_hackathon_access(&auth_user, &model)?;
    let criteria = load_criteria(&state.db, id).await?;
    Ok(Json(hackathon_response(model, criteria)))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Hackathons",
    operation_id = "updateHackathon",
    summary = "Update an existing hackathon",
    description = "Partially updates a hackathon. `judging_criteria`, when present, replaces the whole criteria list and is rejected with PHASE_CLOSED once judging has started. `status` may move in any direction. The merged schedule must stay in lifecycle order. An empty payload returns the current resource unchanged.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = UpdateHackathonRequest,
    responses(
        (status = 200, description = "Hackathon updated", body = HackathonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 402, description = "Criteria limit reached (PLAN_LIMIT_REACHED)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Criteria are locked (PHASE_CLOSED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateHackathonRequest>,
) -> Result<Json<HackathonResponse>, AppError> {
    validate_update_hackathon(&payload, &state.config.limits)?;

    if payload == UpdateHackathonRequest::default() {
        let existing = find_hackathon(&state.db, id).await?;
        require_manager(&auth_user, &existing)?;
        let criteria = load_criteria(&state.db, id).await?;
        return Ok(Json(hackathon_response(existing, criteria)));
    }

    let txn = state.db.begin().await?;
    let existing = find_hackathon_for_update(&txn, id).await?;
    require_manager(&auth_user, &existing)?;

    let schedule = payload.merge_schedule(schedule_of(&existing));
    validate_merged_schedule(&schedule)?;

    if let Some(ref criteria) = payload.judging_criteria {
        require_criteria_editable(&existing)?;
        replace_criteria(&txn, id, criteria).await?;
        info!(hackathon_id = id, count = criteria.len(), "Criteria replaced");
    }

    let previous_status = existing.status;
    let mut active: hackathon::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.registration_opens_at = Set(schedule.registration_opens_at);
    active.registration_closes_at = Set(schedule.registration_closes_at);
    active.hacking_starts_at = Set(schedule.hacking_starts_at);
    active.hacking_ends_at = Set(schedule.hacking_ends_at);
    active.submission_deadline = Set(schedule.submission_deadline);
    active.judging_ends_at = Set(schedule.judging_ends_at);
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    let criteria = load_criteria(&txn, id).await?;
    txn.commit().await?;

    if model.status != previous_status {
        info!(
            hackathon_id = id,
            from = %previous_status,
            to = %model.status,
            "Hackathon status changed"
        );
    }
    Ok(Json(hackathon_response(model, criteria)))
}

#[utoipa::path(
    get,
    path = "/{id}/phase",
    tag = "Hackathons",
    operation_id = "getHackathonPhase",
    summary = "Get what the current phase allows",
    description = "Derives the permission flags, the reason for every denied action, and the phase timeline from the hackathon's current status. Computed fresh on every request.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Phase permissions", body = PhaseResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_phase(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PhaseResponse>, AppError> {
    let model = find_hackathon(&state.db, id).await?;
    check_hackathon_access(&auth_user, &model)?;

    let gate = PhaseGate::new(model.status);
    let denied = Action::ALL
        .iter()
        .filter_map(|&action| {
            gate.message(action).map(|msg| DeniedAction {
                action,
                message: msg.to_string(),
            })
        })
        .collect();

    Ok(Json(PhaseResponse {
        hackathon_id: model.id,
        status: model.status,
        permissions: gate.permissions(),
        denied,
        timeline: timeline(model.status, &schedule_of(&model), chrono::Utc::now()),
    }))
}

async fn submission_review_counts<C: ConnectionTrait>(
    db: &C,
    hackathon_id: i32,
) -> Result<JudgingProgress, AppError> {
    let ids: Vec<i32> = submission::Entity::find()
        .filter(submission::Column::HackathonId.eq(hackathon_id))
        .select_only()
        .column(submission::Column::Id)
        .into_tuple()
        .all(db)
        .await?;
    let counts = review_counts(db, &ids).await?;
    Ok(JudgingProgress::from_review_counts(
        ids.iter().map(|id| counts.get(id).copied().unwrap_or(0)),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/progress",
    tag = "Results",
    operation_id = "getJudgingProgress",
    summary = "Get judging progress",
    description = "Counts the submissions that have at least one review. Results can be published once every submission is reviewed and there is at least one. Visible to organizers and accepted judges.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Judging progress", body = ProgressResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_progress(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProgressResponse>, AppError> {
    let model = find_hackathon(&state.db, id).await?;
    check_hackathon_access(&auth_user, &model)?;
    if !is_manager(&auth_user, &model) && !is_accepted_judge(&state.db, &auth_user, id).await? {
        return Err(AppError::PermissionDenied);
    }

    let progress = submission_review_counts(&state.db, id).await?;
    Ok(Json(ProgressResponse::new(id, progress)))
}

#[utoipa::path(
    post,
    path = "/{id}/publish",
    tag = "Results",
    operation_id = "publishResults",
    summary = "Publish the results",
    description = "Ends judging. Requires status `judging` and every submission reviewed. Sets the hackathon to `completed`, marks the top-ranked submissions `winner` and every other reviewed submission `scored`.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Results published", body = PublishResponse),
        (status = 400, description = "Judging is incomplete (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Hackathon is not in judging (PHASE_CLOSED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn publish_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PublishResponse>, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_hackathon_for_update(&txn, id).await?;
    require_manager(&auth_user, &existing)?;

    if existing.status != HackathonStatus::Judging {
        return Err(AppError::PhaseClosed(
            "Results can only be published while judging is in progress".into(),
        ));
    }

    let progress = submission_review_counts(&txn, id).await?;
    if !progress.is_complete() {
        return Err(AppError::Validation(format!(
            "Every submission must be reviewed before publishing ({}/{} reviewed)",
            progress.reviewed, progress.total
        )));
    }

    let submissions = submission::Entity::find()
        .filter(submission::Column::HackathonId.eq(id))
        .order_by_asc(submission::Column::Id)
        .all(&txn)
        .await?;
    let board = rank(submissions, |s| s.average_score);

    let winner_count = usize::try_from(state.config.judging.winner_count).unwrap_or(usize::MAX);
    let (winners, scored): (Vec<i32>, Vec<i32>) = {
        let ids: Vec<i32> = board.ranked.iter().map(|e| e.item.id).collect();
        let split = winner_count.min(ids.len());
        (ids[..split].to_vec(), ids[split..].to_vec())
    };

    let now = chrono::Utc::now();
    for (ids, status) in [
        (&winners, SubmissionStatus::Winner),
        (&scored, SubmissionStatus::Scored),
    ] {
        if ids.is_empty() {
            continue;
        }
        submission::Entity::update_many()
            .filter(submission::Column::Id.is_in(ids.iter().copied()))
            .col_expr(submission::Column::Status, Expr::value(status))
            .col_expr(submission::Column::UpdatedAt, Expr::value(now))
            .exec(&txn)
            .await?;
    }

    let mut active: hackathon::ActiveModel = existing.into();
    active.status = Set(HackathonStatus::Completed);
    active.updated_at = Set(now);
    let model = active.update(&txn).await?;
    txn.commit().await?;

    info!(
        hackathon_id = id,
        winners = ?winners,
        scored = scored.len(),
        "Results published"
    );
    Ok(Json(PublishResponse {
        hackathon_id: id,
        status: model.status,
        winners,
    }))
}

#[utoipa::path(
    get,
    path = "/{id}/leaderboard",
    tag = "Results",
    operation_id = "getLeaderboard",
    summary = "Get the leaderboard",
    description = "Ranks submissions by their average judge score on a 0-100 scale, highest first; ties keep submission order. Submissions without reviews are listed separately under `unscored`. Organizers can always view it; everyone else only once results are published.",
    params(("id" = i32, Path, description = "Hackathon ID"), LeaderboardQuery),
    responses(
        (status = 200, description = "Leaderboard", body = LeaderboardResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Results not published (PHASE_CLOSED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(id))]
pub async fn get_leaderboard(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let model = find_hackathon(&state.db, id).await?;
    check_hackathon_access(&auth_user, &model)?;
    if !is_manager(&auth_user, &model) {
        require_phase(&model, Action::ViewResults)?;
    }

    let track = query
        .track
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let mut select = submission::Entity::find().filter(submission::Column::HackathonId.eq(id));
    if let Some(ref track) = track {
        select = select.filter(submission::Column::Track.eq(track.as_str()));
    }
    let submissions = select
        .order_by_asc(submission::Column::Id)
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = submissions.iter().map(|s| s.id).collect();
    let team_ids: Vec<i32> = submissions.iter().map(|s| s.team_id).collect();
    let counts = review_counts(&state.db, &ids).await?;
    let teams = team_names(&state.db, &team_ids).await?;

    let items = submissions.into_iter().map(|s| LeaderboardSubmission {
        submission_id: s.id,
        team_name: teams.get(&s.team_id).cloned().unwrap_or_default(),
        review_count: counts.get(&s.id).copied().unwrap_or(0),
        project_name: s.project_name,
        track: s.track,
        status: s.status,
        average_score: s.average_score,
    });
    let board = rank(items, |s| s.average_score);

    Ok(Json(LeaderboardResponse {
        hackathon_id: id,
        status: model.status,
        track,
        entries: board
            .ranked
            .into_iter()
            .map(|e| LeaderboardEntry {
                rank: e.rank,
                score: round1(e.score),
                submission: e.item,
            })
            .collect(),
        unscored: board.unscored,
    }))
}
