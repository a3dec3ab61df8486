use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "judging_criterion")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub hackathon_id: i32,
    #[sea_orm(belongs_to, from = "hackathon_id", to = "id")]
    pub hackathon: HasOne<super::hackathon::Entity>,

    pub name: String,
    pub description: String,
    /// Percentage weight. NULL counts as an effective weight of 1.
    pub weight: Option<f64>,
    #[sea_orm(default_value = 10)]
    pub max_score: i32,

    #[sea_orm(default_value = 0)]
    pub position: i32,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for judging::criteria::JudgingCriterion {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            weight: m.weight,
            max_score: m.max_score,
        }
    }
}
