use judging::criteria::JudgingCriterion;
use judging::{Action, HackathonStatus, PhaseGate};
use sea_orm::sea_query::LockType;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::entity::{hackathon, hackathon_judge, judging_criterion, submission};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;

/// Look up a hackathon by ID, returning 404 if not found.
pub async fn find_hackathon<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<hackathon::Model, AppError> {
    hackathon::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))
}

/// Same as [`find_hackathon`], holding a row lock until the transaction ends.
pub async fn find_hackathon_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<hackathon::Model, AppError> {
    hackathon::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))
}

pub async fn find_submission<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<submission::Model, AppError> {
    submission::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))
}

/// Whether the caller organizes this hackathon: its owner with
/// `hackathon:manage`, or anyone with `hackathon:manage_any`.
pub fn is_manager(auth_user: &AuthUser, hackathon: &hackathon::Model) -> bool {
    auth_user.has_permission("hackathon:manage_any")
        || (auth_user.has_permission("hackathon:manage") && hackathon.owner_id == auth_user.user_id)
}

pub fn require_manager(auth_user: &AuthUser, hackathon: &hackathon::Model) -> Result<(), AppError> {
    if is_manager(auth_user, hackathon) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Drafts are only visible to their organizers. Returns 404 rather than 403
/// so draft IDs cannot be probed.
pub fn check_hackathon_access(
    auth_user: &AuthUser,
    hackathon: &hackathon::Model,
) -> Result<(), AppError> {
    if hackathon.status == HackathonStatus::Draft && !is_manager(auth_user, hackathon) {
        return Err(AppError::NotFound("Hackathon not found".into()));
    }
    Ok(())
}

/// Deny an action the hackathon's current phase does not allow.
///
/// The gate is rebuilt from the freshly loaded row on every call.
pub fn require_phase(hackathon: &hackathon::Model, action: Action) -> Result<(), AppError> {
    let gate = PhaseGate::new(hackathon.status);
    match gate.message(action) {
        None => Ok(()),
        Some(msg) => {
            tracing::debug!(
                hackathon_id = hackathon.id,
                status = %hackathon.status,
                ?action,
                "Phase gate denied action"
            );
            Err(AppError::PhaseClosed(msg.into()))
        }
    }
}

/// Criteria can be edited until judging starts.
pub fn require_criteria_editable(hackathon: &hackathon::Model) -> Result<(), AppError> {
    if hackathon.status.judging_started() {
        return Err(AppError::PhaseClosed(
            "Judging criteria are locked once judging has started".into(),
        ));
    }
    Ok(())
}

/// The hackathon's criteria in display order.
pub async fn load_criteria<C: ConnectionTrait>(
    db: &C,
    hackathon_id: i32,
) -> Result<Vec<JudgingCriterion>, AppError> {
    let models = judging_criterion::Entity::find()
        .filter(judging_criterion::Column::HackathonId.eq(hackathon_id))
        .order_by_asc(judging_criterion::Column::Position)
        .order_by_asc(judging_criterion::Column::Id)
        .all(db)
        .await?;
    Ok(models.into_iter().map(JudgingCriterion::from).collect())
}

/// Require the caller to be a judge of the hackathon who accepted the invitation.
pub async fn require_accepted_judge<C: ConnectionTrait>(
    db: &C,
    auth_user: &AuthUser,
    hackathon_id: i32,
) -> Result<hackathon_judge::Model, AppError> {
    auth_user.require_permission("judge:score")?;
    let judge = hackathon_judge::Entity::find_by_id((hackathon_id, auth_user.user_id))
        .one(db)
        .await?;
    match judge {
        Some(j) if j.accepted_at.is_some() => Ok(j),
        Some(_) => {
            tracing::debug!(
                hackathon_id,
                user_id = auth_user.user_id,
                "Judge has not accepted the invitation"
            );
            Err(AppError::PermissionDenied)
        }
        None => Err(AppError::PermissionDenied),
    }
}

/// Whether the caller is an accepted judge, without failing.
pub async fn is_accepted_judge<C: ConnectionTrait>(
    db: &C,
    auth_user: &AuthUser,
    hackathon_id: i32,
) -> Result<bool, AppError> {
    let judge = hackathon_judge::Entity::find_by_id((hackathon_id, auth_user.user_id))
        .one(db)
        .await?;
    Ok(judge.is_some_and(|j| j.accepted_at.is_some()))
}

/// Next free criterion position within a hackathon.
pub async fn next_criterion_position<C: ConnectionTrait>(
    db: &C,
    hackathon_id: i32,
) -> Result<i32, AppError> {
    let max_pos: Option<i32> = judging_criterion::Entity::find()
        .filter(judging_criterion::Column::HackathonId.eq(hackathon_id))
        .select_only()
        .column_as(judging_criterion::Column::Position.max(), "max_pos")
        .into_tuple::<Option<i32>>()
        .one(db)
        .await?
        .flatten();
    max_pos
        .unwrap_or(-1)
        .checked_add(1)
        .ok_or_else(|| AppError::Validation("Position overflow".into()))
}
