use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use judging::review::{SubmitReviewRequest, average_score, display_average};
use judging::scoring::score_sheet;
use judging::{Action, SubmissionStatus};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{review, review_score, submission};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::review::*;
use crate::models::shared::validate_text;
use crate::state::AppState;
use crate::utils::hackathon::{
    find_hackathon, find_hackathon_for_update, find_submission, is_accepted_judge, is_manager,
    load_criteria, require_accepted_judge, require_phase,
};

const MAX_FEEDBACK_CHARS: usize = 5000;

fn clean_feedback(feedback: Option<&str>) -> Option<String> {
    feedback
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

#[utoipa::path(
    post,
    path = "/{id}/scores",
    tag = "Reviews",
    operation_id = "submitReview",
    summary = "Submit a review",
    description = "Stores the caller's scores for a submission. The caller must be an accepted judge and the hackathon must be in `judging`. Every criterion must be scored exactly once; the server recomputes the 0-100 total and rejects a client `total_score` that differs by more than the configured tolerance. Each judge has one review per submission: resubmitting requires `replaces_version` equal to the stored version, otherwise 409. Returns 201 for a new review and 200 for a replacement.",
    params(("id" = i32, Path, description = "Submission ID")),
    request_body = SubmitReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 200, description = "Review replaced", body = ReviewResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an accepted judge (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Version mismatch (CONFLICT) or judging closed (PHASE_CLOSED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, judge_id = auth_user.user_id))]
pub async fn submit_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SubmitReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(ref feedback) = payload.overall_feedback {
        validate_text(feedback, "Overall feedback", MAX_FEEDBACK_CHARS)?;
    }
    for raw in &payload.criteria {
        if let Some(ref feedback) = raw.feedback {
            validate_text(feedback, "Criterion feedback", MAX_FEEDBACK_CHARS)?;
        }
    }

    let txn = state.db.begin().await?;
    let target = find_submission(&txn, id).await?;
    let hackathon = find_hackathon_for_update(&txn, target.hackathon_id).await?;
    require_accepted_judge(&txn, &auth_user, hackathon.id).await?;
    require_phase(&hackathon, Action::Judge)?;

    let criteria = load_criteria(&txn, hackathon.id).await?;
    if criteria.is_empty() {
        return Err(AppError::Validation(
            "This hackathon has no judging criteria to score against".into(),
        ));
    }
    let sheet = score_sheet(&criteria, &payload.criteria, true)?;
    let total = sheet
        .total
        .ok_or_else(|| AppError::Validation("Nothing to score".into()))?;

    if let Some(client_total) = payload.total_score
        && (client_total - total).abs() > state.config.judging.score_tolerance
    {
        return Err(AppError::Validation(format!(
            "total_score {client_total} does not match the computed total {total}"
        )));
    }

    let existing = review::Entity::find()
        .filter(review::Column::SubmissionId.eq(id))
        .filter(review::Column::JudgeId.eq(auth_user.user_id))
        .one(&txn)
        .await?;

    let now = chrono::Utc::now();
    let overall_feedback = clean_feedback(payload.overall_feedback.as_deref());
    let (saved, created) = match (existing, payload.replaces_version) {
        (None, None) => {
            let model = review::ActiveModel {
                submission_id: Set(id),
                judge_id: Set(auth_user.user_id),
                total_score: Set(total),
                overall_feedback: Set(overall_feedback),
                flagged: Set(payload.flagged),
                version: Set(1),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            (model, true)
        }
        (None, Some(_)) => {
            return Err(AppError::Conflict(
                "There is no existing review to replace".into(),
            ));
        }
        (Some(_), None) => {
            return Err(AppError::Conflict(
                "You have already reviewed this submission; send replaces_version to replace it"
                    .into(),
            ));
        }
        (Some(current), Some(version)) if current.version != version => {
            return Err(AppError::Conflict(format!(
                "Review was changed in the meantime (current version {})",
                current.version
            )));
        }
        (Some(current), Some(_)) => {
            review_score::Entity::delete_many()
                .filter(review_score::Column::ReviewId.eq(current.id))
                .exec(&txn)
                .await?;

            let next_version = current.version + 1;
            let mut active: review::ActiveModel = current.into();
            active.total_score = Set(total);
            active.overall_feedback = Set(overall_feedback);
            active.flagged = Set(payload.flagged);
            active.version = Set(next_version);
            active.updated_at = Set(now);
            (active.update(&txn).await?, false)
        }
    };

    for entry in &sheet.entries {
        review_score::ActiveModel {
            review_id: Set(saved.id),
            criterion_id: Set(entry.criterion_id),
            score: Set(entry.score),
            max_score: Set(entry.max_score),
            weight: Set(entry.weight),
            feedback: Set(entry.feedback.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    // Refresh the submission's average from every judge's total.
    let totals: Vec<f64> = review::Entity::find()
        .filter(review::Column::SubmissionId.eq(id))
        .select_only()
        .column(review::Column::TotalScore)
        .into_tuple()
        .all(&txn)
        .await?;
    let average = average_score(&totals);

    let mut target_active: submission::ActiveModel = target.clone().into();
    target_active.average_score = Set(average);
    if target.status.awaiting_review() {
        target_active.status = Set(SubmissionStatus::UnderReview);
    }
    target_active.updated_at = Set(now);
    target_active.update(&txn).await?;

    let scores = review_score::Entity::find()
        .filter(review_score::Column::ReviewId.eq(saved.id))
        .order_by_asc(review_score::Column::Id)
        .all(&txn)
        .await?;
    txn.commit().await?;

    info!(
        submission_id = id,
        judge_id = auth_user.user_id,
        total,
        version = saved.version,
        average = ?average,
        "Review saved"
    );
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(review_response(saved, scores))))
}

#[utoipa::path(
    get,
    path = "/{id}/scores",
    tag = "Reviews",
    operation_id = "listReviews",
    summary = "List a submission's reviews",
    description = "Organizers see every review; an accepted judge sees only their own.",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Reviews", body = ReviewListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_reviews(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ReviewListResponse>, AppError> {
    let target = find_submission(&state.db, id).await?;
    let hackathon = find_hackathon(&state.db, target.hackathon_id).await?;

    let mut select = review::Entity::find().filter(review::Column::SubmissionId.eq(id));
    if !is_manager(&auth_user, &hackathon) {
        if !is_accepted_judge(&state.db, &auth_user, hackathon.id).await? {
            return Err(AppError::PermissionDenied);
        }
        select = select.filter(review::Column::JudgeId.eq(auth_user.user_id));
    }
    let reviews = select
        .order_by_asc(review::Column::Id)
        .all(&state.db)
        .await?;

    let review_ids: Vec<i32> = reviews.iter().map(|r| r.id).collect();
    let mut scores: HashMap<i32, Vec<review_score::Model>> = HashMap::new();
    if !review_ids.is_empty() {
        for s in review_score::Entity::find()
            .filter(review_score::Column::ReviewId.is_in(review_ids))
            .order_by_asc(review_score::Column::Id)
            .all(&state.db)
            .await?
        {
            scores.entry(s.review_id).or_default().push(s);
        }
    }

    let data = reviews
        .into_iter()
        .map(|r| {
            let review_scores = scores.remove(&r.id).unwrap_or_default();
            review_response(r, review_scores)
        })
        .collect();

    Ok(Json(ReviewListResponse {
        submission_id: id,
        average_score: display_average(target.average_score),
        data,
    }))
}
