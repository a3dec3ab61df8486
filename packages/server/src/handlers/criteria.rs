use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use judging::criteria::{
    JudgingCriterion, validate_criterion, validate_reorder, validate_total_weight,
};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::judging_criterion;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::criteria::*;
use crate::state::AppState;
use crate::utils::hackathon::{
    check_hackathon_access, find_hackathon, find_hackathon_for_update, load_criteria,
    next_criterion_position, require_criteria_editable, require_manager,
};

/// Replace every criterion of a hackathon with `criteria`, positioned by index.
pub(crate) async fn replace_criteria(
    txn: &DatabaseTransaction,
    hackathon_id: i32,
    criteria: &[CriterionInput],
) -> Result<(), AppError> {
    judging_criterion::Entity::delete_many()
        .filter(judging_criterion::Column::HackathonId.eq(hackathon_id))
        .exec(txn)
        .await?;

    for (i, c) in criteria.iter().enumerate() {
        let position = i32::try_from(i)
            .map_err(|_| AppError::Validation("Too many judging criteria".into()))?;
        judging_criterion::ActiveModel {
            hackathon_id: Set(hackathon_id),
            name: Set(c.name.trim().to_string()),
            description: Set(c.description.clone()),
            weight: Set(c.weight),
            max_score: Set(c.max_score()),
            position: Set(position),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

async fn find_criterion<C: ConnectionTrait>(
    db: &C,
    hackathon_id: i32,
    criterion_id: i32,
) -> Result<judging_criterion::Model, AppError> {
    judging_criterion::Entity::find_by_id(criterion_id)
        .filter(judging_criterion::Column::HackathonId.eq(hackathon_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Criterion not found".into()))
}

#[utoipa::path(
    get,
    path = "/{id}/criteria",
    tag = "Judging Criteria",
    operation_id = "listCriteria",
    summary = "List a hackathon's judging criteria",
    description = "Returns the criteria in display order.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Judging criteria", body = Vec<JudgingCriterion>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_criteria(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<JudgingCriterion>>, AppError> {
    let hackathon = find_hackathon(&state.db, id).await?;
    check_hackathon_access(&auth_user, &hackathon)?;
    Ok(Json(load_criteria(&state.db, id).await?))
}

#[utoipa::path(
    post,
    path = "/{id}/criteria",
    tag = "Judging Criteria",
    operation_id = "addCriterion",
    summary = "Add a judging criterion",
    description = "Appends a criterion to the hackathon. Only the hackathon's organizers may call this, and only before judging starts. The resulting set must keep a positive total weight.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = CriterionInput,
    responses(
        (status = 201, description = "Criterion added", body = JudgingCriterion),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 402, description = "Criteria limit reached (PLAN_LIMIT_REACHED)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Criteria are locked (PHASE_CLOSED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, name = %payload.name))]
pub async fn add_criterion(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CriterionInput>,
) -> Result<impl IntoResponse, AppError> {
    validate_criterion(
        &payload.name,
        &payload.description,
        payload.weight,
        payload.max_score(),
    )?;

    let txn = state.db.begin().await?;
    let hackathon = find_hackathon_for_update(&txn, id).await?;
    require_manager(&auth_user, &hackathon)?;
    require_criteria_editable(&hackathon)?;

    let current = load_criteria(&txn, id).await?;
    let max_criteria = state.config.limits.max_criteria;
    if current.len() as u64 >= max_criteria {
        return Err(AppError::PlanLimitReached(format!(
            "Your plan allows at most {max_criteria} judging criteria per hackathon"
        )));
    }
    validate_total_weight(
        current
            .iter()
            .map(|c| c.weight)
            .chain(std::iter::once(payload.weight)),
    )?;

    let position = next_criterion_position(&txn, id).await?;
    let model = judging_criterion::ActiveModel {
        hackathon_id: Set(id),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description.clone()),
        weight: Set(payload.weight),
        max_score: Set(payload.max_score()),
        position: Set(position),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(hackathon_id = id, criterion_id = model.id, "Criterion added");
    Ok((StatusCode::CREATED, Json(JudgingCriterion::from(model))))
}

#[utoipa::path(
    patch,
    path = "/{id}/criteria/{criterion_id}",
    tag = "Judging Criteria",
    operation_id = "updateCriterion",
    summary = "Update a judging criterion",
    description = "Partially updates one criterion. Sending `weight: null` clears the weight (effective weight 1). Locked once judging starts.",
    params(
        ("id" = i32, Path, description = "Hackathon ID"),
        ("criterion_id" = i32, Path, description = "Criterion ID"),
    ),
    request_body = UpdateCriterionRequest,
    responses(
        (status = 200, description = "Criterion updated", body = JudgingCriterion),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon or criterion not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Criteria are locked (PHASE_CLOSED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, criterion_id))]
pub async fn update_criterion(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, criterion_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdateCriterionRequest>,
) -> Result<Json<JudgingCriterion>, AppError> {
    let txn = state.db.begin().await?;
    let hackathon = find_hackathon_for_update(&txn, id).await?;
    require_manager(&auth_user, &hackathon)?;
    let existing = find_criterion(&txn, id, criterion_id).await?;

    if payload == UpdateCriterionRequest::default() {
        return Ok(Json(existing.into()));
    }
    require_criteria_editable(&hackathon)?;

    let name = payload.name.as_deref().unwrap_or(&existing.name).trim().to_string();
    let description = payload
        .description
        .clone()
        .unwrap_or_else(|| existing.description.clone());
    let weight = payload.weight.unwrap_or(existing.weight);
    let max_score = payload.max_score.unwrap_or(existing.max_score);
    validate_criterion(&name, &description, weight, max_score)?;

    let current = load_criteria(&txn, id).await?;
    validate_total_weight(
        current
            .iter()
            .map(|c| if c.id == criterion_id { weight } else { c.weight }),
    )?;

    let mut active: judging_criterion::ActiveModel = existing.into();
    active.name = Set(name);
    active.description = Set(description);
    active.weight = Set(weight);
    active.max_score = Set(max_score);
    let model = active.update(&txn).await?;

    txn.commit().await?;
    info!(hackathon_id = id, criterion_id, "Criterion updated");
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}/criteria/{criterion_id}",
    tag = "Judging Criteria",
    operation_id = "removeCriterion",
    summary = "Remove a judging criterion",
    description = "Deletes one criterion. The remaining set must keep a positive total weight. Locked once judging starts.",
    params(
        ("id" = i32, Path, description = "Hackathon ID"),
        ("criterion_id" = i32, Path, description = "Criterion ID"),
    ),
    responses(
        (status = 204, description = "Criterion removed"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon or criterion not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Criteria are locked (PHASE_CLOSED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, criterion_id))]
pub async fn remove_criterion(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, criterion_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let hackathon = find_hackathon_for_update(&txn, id).await?;
    require_manager(&auth_user, &hackathon)?;
    require_criteria_editable(&hackathon)?;
    let existing = find_criterion(&txn, id, criterion_id).await?;

    let current = load_criteria(&txn, id).await?;
    validate_total_weight(
        current
            .iter()
            .filter(|c| c.id != criterion_id)
            .map(|c| c.weight),
    )?;

    existing.delete(&txn).await?;
    txn.commit().await?;
    info!(hackathon_id = id, criterion_id, "Criterion removed");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/{id}/criteria/reorder",
    tag = "Judging Criteria",
    operation_id = "reorderCriteria",
    summary = "Reorder judging criteria",
    description = "Replaces the ordering of all criteria. The ID array must contain exactly the hackathon's current criteria. Positions are assigned by array index starting at 0.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = ReorderCriteriaRequest,
    responses(
        (status = 204, description = "Criteria reordered"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Criteria are locked (PHASE_CLOSED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn reorder_criteria(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ReorderCriteriaRequest>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let hackathon = find_hackathon_for_update(&txn, id).await?;
    require_manager(&auth_user, &hackathon)?;
    require_criteria_editable(&hackathon)?;

    let current: Vec<i32> = judging_criterion::Entity::find()
        .filter(judging_criterion::Column::HackathonId.eq(id))
        .select_only()
        .column(judging_criterion::Column::Id)
        .into_tuple::<i32>()
        .all(&txn)
        .await?;
    validate_reorder(&current, &payload.criterion_ids)?;

    for (i, &criterion_id) in payload.criterion_ids.iter().enumerate() {
        judging_criterion::Entity::update_many()
            .filter(judging_criterion::Column::HackathonId.eq(id))
            .filter(judging_criterion::Column::Id.eq(criterion_id))
            .col_expr(
                judging_criterion::Column::Position,
                Expr::value(
                    i32::try_from(i)
                        .map_err(|_| AppError::Validation("Too many criteria to reorder".into()))?,
                ),
            )
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
