use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::hackathon_judge;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::judge::*;
use crate::state::AppState;
use crate::utils::hackathon::{find_hackathon, find_hackathon_for_update, require_manager};

#[utoipa::path(
    get,
    path = "/{id}/judges",
    tag = "Judges",
    operation_id = "listJudges",
    summary = "List a hackathon's judges",
    description = "Returns invited and accepted judges in invitation order. Organizers only.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Judges", body = Vec<JudgeResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_judges(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<JudgeResponse>>, AppError> {
    let hackathon = find_hackathon(&state.db, id).await?;
    require_manager(&auth_user, &hackathon)?;

    let judges = hackathon_judge::Entity::find()
        .filter(hackathon_judge::Column::HackathonId.eq(id))
        .order_by_asc(hackathon_judge::Column::InvitedAt)
        .order_by_asc(hackathon_judge::Column::UserId)
        .all(&state.db)
        .await?;

    Ok(Json(judges.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/{id}/judges",
    tag = "Judges",
    operation_id = "inviteJudge",
    summary = "Invite a judge",
    description = "Invites a user to judge the hackathon. The invitation stays pending until the user accepts it. Returns 402 when the plan's judge limit is reached and 409 if the user is already invited.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = InviteJudgeRequest,
    responses(
        (status = 201, description = "Judge invited", body = JudgeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 402, description = "Judge limit reached (PLAN_LIMIT_REACHED)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already invited (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = payload.user_id))]
pub async fn invite_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<InviteJudgeRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_invite_judge(&payload)?;

    let txn = state.db.begin().await?;
    let hackathon = find_hackathon_for_update(&txn, id).await?;
    require_manager(&auth_user, &hackathon)?;

    if hackathon_judge::Entity::find_by_id((id, payload.user_id))
        .one(&txn)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "User is already a judge of this hackathon".into(),
        ));
    }

    let judge_count = hackathon_judge::Entity::find()
        .filter(hackathon_judge::Column::HackathonId.eq(id))
        .count(&txn)
        .await?;
    let max_judges = state.config.limits.max_judges_per_hackathon;
    if judge_count >= max_judges {
        tracing::warn!(hackathon_id = id, max_judges, "Judge limit reached");
        return Err(AppError::PlanLimitReached(format!(
            "Your plan allows at most {max_judges} judges per hackathon"
        )));
    }

    let model = hackathon_judge::ActiveModel {
        hackathon_id: Set(id),
        user_id: Set(payload.user_id),
        username: Set(payload.username.trim().to_string()),
        invited_at: Set(chrono::Utc::now()),
        accepted_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(hackathon_id = id, user_id = model.user_id, "Judge invited");
    Ok((StatusCode::CREATED, Json(JudgeResponse::from(model))))
}

#[utoipa::path(
    post,
    path = "/{id}/judges/accept",
    tag = "Judges",
    operation_id = "acceptJudgeInvitation",
    summary = "Accept a judge invitation",
    description = "Accepts the caller's pending invitation. Accepting twice is a no-op. Requires `judge:score` permission.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Invitation accepted", body = JudgeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No invitation (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn accept_invitation(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<JudgeResponse>, AppError> {
    auth_user.require_permission("judge:score")?;

    let txn = state.db.begin().await?;
    find_hackathon_for_update(&txn, id).await?;

    let invitation = hackathon_judge::Entity::find_by_id((id, auth_user.user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("No judge invitation for this hackathon".into()))?;

    if invitation.accepted_at.is_some() {
        return Ok(Json(invitation.into()));
    }

    let mut active: hackathon_judge::ActiveModel = invitation.into();
    active.accepted_at = Set(Some(chrono::Utc::now()));
    let model = active.update(&txn).await?;

    txn.commit().await?;
    info!(hackathon_id = id, user_id = auth_user.user_id, "Judge invitation accepted");
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}/judges/{user_id}",
    tag = "Judges",
    operation_id = "removeJudge",
    summary = "Remove a judge",
    description = "Withdraws an invitation or removes an accepted judge. Reviews the judge already submitted are kept.",
    params(
        ("id" = i32, Path, description = "Hackathon ID"),
        ("user_id" = i32, Path, description = "Judge user ID"),
    ),
    responses(
        (status = 204, description = "Judge removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon or judge not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id))]
pub async fn remove_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let hackathon = find_hackathon_for_update(&txn, id).await?;
    require_manager(&auth_user, &hackathon)?;

    let result = hackathon_judge::Entity::delete_by_id((id, user_id))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Judge not found".into()));
    }

    txn.commit().await?;
    info!(hackathon_id = id, user_id, "Judge removed");
    Ok(StatusCode::NO_CONTENT)
}
