use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One judge's evaluation of one submission.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub submission_id: i32,
    #[sea_orm(belongs_to, from = "submission_id", to = "id")]
    pub submission: HasOne<super::submission::Entity>,

    pub judge_id: i32,
    /// Normalized 0-100 total, recomputed by the server.
    pub total_score: f64,
    pub overall_feedback: Option<String>,
    pub flagged: bool,
    /// Bumped on every replacement; clients send it back to replace the review.
    pub version: i32,

    #[sea_orm(has_many)]
    pub scores: HasMany<super::review_score::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
