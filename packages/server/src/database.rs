use std::time::Duration;

use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder, SqliteQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr};
use tracing::{info, warn};

use crate::entity::{review, submission, team_member};

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("judging_server::entity::*")
        .sync(&db)
        .await?;
    ensure_indexes(&db).await?;

    Ok(db)
}

/// Ensure the composite indexes exist.
///
/// Schema sync only knows single-column constraints, so the uniqueness rules
/// spanning two columns are created here.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // One review per judge per submission.
    create_index(
        db,
        "idx_review_submission_judge",
        Index::create()
            .unique()
            .table(review::Entity)
            .col(review::Column::SubmissionId)
            .col(review::Column::JudgeId)
            .to_owned(),
    )
    .await?;

    // A user belongs to at most one team per hackathon.
    create_index(
        db,
        "idx_team_member_hackathon_user",
        Index::create()
            .unique()
            .table(team_member::Entity)
            .col(team_member::Column::HackathonId)
            .col(team_member::Column::UserId)
            .to_owned(),
    )
    .await?;

    // Leaderboard and progress queries list a hackathon's submissions.
    create_index(
        db,
        "idx_submission_hackathon",
        Index::create()
            .table(submission::Entity)
            .col(submission::Column::HackathonId)
            .col(submission::Column::Id)
            .to_owned(),
    )
    .await
}

async fn create_index(
    db: &DatabaseConnection,
    name: &str,
    mut stmt: IndexCreateStatement,
) -> Result<(), DbErr> {
    stmt.if_not_exists().name(name);
    let sql = match db.get_database_backend() {
        DbBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        _ => stmt.to_string(PostgresQueryBuilder),
    };

    match db.execute_unprepared(&sql).await {
        Ok(_) => {
            info!("Ensured index {} exists", name);
            Ok(())
        }
        Err(e) => {
            warn!("Failed to create index {}: {}", name, e);
            Err(e)
        }
    }
}
