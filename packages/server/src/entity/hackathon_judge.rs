use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A judge invited to a hackathon. The invitation is pending until `accepted_at` is set.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hackathon_judge")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub hackathon_id: i32,
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "hackathon_id", to = "id")]
    pub hackathon: HasOne<super::hackathon::Entity>,

    pub username: String,
    pub invited_at: DateTimeUtc,
    pub accepted_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
