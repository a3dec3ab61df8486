use judging::scoring::ScoreEntry;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Score for one criterion within a review. `max_score` and `weight` are
/// snapshots of the criterion at scoring time.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review_score")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub review_id: i32,
    #[sea_orm(belongs_to, from = "review_id", to = "id")]
    pub review: HasOne<super::review::Entity>,

    pub criterion_id: i32,
    pub score: f64,
    pub max_score: i32,
    pub weight: Option<f64>,
    pub feedback: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ScoreEntry {
    fn from(m: Model) -> Self {
        Self {
            criterion_id: m.criterion_id,
            score: m.score,
            max_score: m.max_score,
            weight: m.weight,
            feedback: m.feedback,
        }
    }
}
