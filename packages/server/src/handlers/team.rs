use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use judging::Action;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{hackathon, team, team_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::team::*;
use crate::state::AppState;
use crate::utils::hackathon::{
    check_hackathon_access, find_hackathon, find_hackathon_for_update, require_phase,
};

/// Shared checks for creating and joining a team: the caller may join teams,
/// can see the hackathon, the phase allows it, and they have no team yet.
async fn check_can_join(
    txn: &DatabaseTransaction,
    auth_user: &AuthUser,
    hackathon: &hackathon::Model,
) -> Result<(), AppError> {
    check_hackathon_access(auth_user, hackathon)?;
    require_phase(hackathon, Action::FormTeams)?;

    let existing = team_member::Entity::find()
        .filter(team_member::Column::HackathonId.eq(hackathon.id))
        .filter(team_member::Column::UserId.eq(auth_user.user_id))
        .one(txn)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "You are already in a team for this hackathon".into(),
        ));
    }
    Ok(())
}

async fn load_members<C: ConnectionTrait>(
    db: &C,
    team_id: i32,
) -> Result<Vec<team_member::Model>, AppError> {
    Ok(team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team_id))
        .order_by_asc(team_member::Column::JoinedAt)
        .order_by_asc(team_member::Column::UserId)
        .all(db)
        .await?)
}

#[utoipa::path(
    get,
    path = "/{id}/teams",
    tag = "Teams",
    operation_id = "listTeams",
    summary = "List a hackathon's teams",
    description = "Returns every team with its members.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Teams", body = Vec<TeamResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_teams(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<TeamResponse>>, AppError> {
    let hackathon = find_hackathon(&state.db, id).await?;
    check_hackathon_access(&auth_user, &hackathon)?;

    let teams = team::Entity::find()
        .filter(team::Column::HackathonId.eq(id))
        .order_by_asc(team::Column::Id)
        .all(&state.db)
        .await?;

    let mut members: HashMap<i32, Vec<team_member::Model>> = HashMap::new();
    for m in team_member::Entity::find()
        .filter(team_member::Column::HackathonId.eq(id))
        .order_by_asc(team_member::Column::JoinedAt)
        .order_by_asc(team_member::Column::UserId)
        .all(&state.db)
        .await?
    {
        members.entry(m.team_id).or_default().push(m);
    }

    let data = teams
        .into_iter()
        .map(|t| {
            let team_members = members.remove(&t.id).unwrap_or_default();
            team_response(t, team_members)
        })
        .collect();
    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/{id}/teams",
    tag = "Teams",
    operation_id = "createTeam",
    summary = "Create a team",
    description = "Creates a team with the caller as its first member. Team formation closes once the hackathon reaches `submission`. A user can be in at most one team per hackathon. Requires `team:join` permission.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already in a team (CONFLICT) or teams locked (PHASE_CLOSED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, name = %payload.name))]
pub async fn create_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateTeamRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("team:join")?;
    validate_create_team(&payload)?;

    let txn = state.db.begin().await?;
    let hackathon = find_hackathon_for_update(&txn, id).await?;
    check_can_join(&txn, &auth_user, &hackathon).await?;

    let now = chrono::Utc::now();
    let model = team::ActiveModel {
        hackathon_id: Set(id),
        name: Set(payload.name.trim().to_string()),
        created_by: Set(auth_user.user_id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    team_member::ActiveModel {
        team_id: Set(model.id),
        user_id: Set(auth_user.user_id),
        hackathon_id: Set(id),
        username: Set(auth_user.username.clone()),
        joined_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let members = load_members(&txn, model.id).await?;
    txn.commit().await?;

    info!(hackathon_id = id, team_id = model.id, "Team created");
    Ok((StatusCode::CREATED, Json(team_response(model, members))))
}

#[utoipa::path(
    post,
    path = "/{id}/teams/{team_id}/join",
    tag = "Teams",
    operation_id = "joinTeam",
    summary = "Join a team",
    description = "Adds the caller to an existing team. Same phase and one-team-per-hackathon rules as creating a team.",
    params(
        ("id" = i32, Path, description = "Hackathon ID"),
        ("team_id" = i32, Path, description = "Team ID"),
    ),
    responses(
        (status = 200, description = "Joined the team", body = TeamResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon or team not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already in a team (CONFLICT) or teams locked (PHASE_CLOSED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, team_id))]
pub async fn join_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, team_id)): Path<(i32, i32)>,
) -> Result<Json<TeamResponse>, AppError> {
    auth_user.require_permission("team:join")?;

    let txn = state.db.begin().await?;
    let hackathon = find_hackathon_for_update(&txn, id).await?;
    check_can_join(&txn, &auth_user, &hackathon).await?;

    let model = team::Entity::find_by_id(team_id)
        .filter(team::Column::HackathonId.eq(id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))?;

    team_member::ActiveModel {
        team_id: Set(team_id),
        user_id: Set(auth_user.user_id),
        hackathon_id: Set(id),
        username: Set(auth_user.username.clone()),
        joined_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let members = load_members(&txn, team_id).await?;
    txn.commit().await?;

    info!(hackathon_id = id, team_id, user_id = auth_user.user_id, "Team joined");
    Ok(Json(team_response(model, members)))
}
