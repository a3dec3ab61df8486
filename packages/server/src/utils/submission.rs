use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};

use crate::entity::{review, team, team_member};
use crate::error::AppError;

/// Number of reviews per submission. Submissions without reviews are absent.
pub async fn review_counts<C: ConnectionTrait>(
    db: &C,
    submission_ids: &[i32],
) -> Result<HashMap<i32, u64>, AppError> {
    if submission_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, i64)> = review::Entity::find()
        .filter(review::Column::SubmissionId.is_in(submission_ids.iter().copied()))
        .select_only()
        .column(review::Column::SubmissionId)
        .column_as(review::Column::Id.count(), "review_count")
        .group_by(review::Column::SubmissionId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, count)| (id, count.max(0) as u64))
        .collect())
}

pub async fn team_names<C: ConnectionTrait>(
    db: &C,
    team_ids: &[i32],
) -> Result<HashMap<i32, String>, AppError> {
    if team_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, String)> = team::Entity::find()
        .filter(team::Column::Id.is_in(team_ids.iter().copied()))
        .select_only()
        .column(team::Column::Id)
        .column(team::Column::Name)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows.into_iter().collect())
}

/// Whether the user is a member of the team.
pub async fn is_team_member<C: ConnectionTrait>(
    db: &C,
    team_id: i32,
    user_id: i32,
) -> Result<bool, AppError> {
    Ok(team_member::Entity::find_by_id((team_id, user_id))
        .one(db)
        .await?
        .is_some())
}
