use judging::HackathonStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hackathon")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub description: String, // in Markdown
    pub status: HackathonStatus,
    /// User ID of the organizer who created the hackathon.
    pub owner_id: i32,

    pub registration_opens_at: Option<DateTimeUtc>,
    pub registration_closes_at: Option<DateTimeUtc>,
    pub hacking_starts_at: Option<DateTimeUtc>,
    pub hacking_ends_at: Option<DateTimeUtc>,
    pub submission_deadline: Option<DateTimeUtc>,
    pub judging_ends_at: Option<DateTimeUtc>,

    #[sea_orm(has_many)]
    pub criteria: HasMany<super::judging_criterion::Entity>,

    #[sea_orm(has_many)]
    pub judges: HasMany<super::hackathon_judge::Entity>,

    #[sea_orm(has_many)]
    pub teams: HasMany<super::team::Entity>,

    #[sea_orm(has_many)]
    pub submissions: HasMany<super::submission::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
