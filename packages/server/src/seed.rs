use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder};
use sea_orm::*;
use tracing::{info, warn};

use crate::entity::{solve, team};
use crate::scoring::ledger::SOLVE_KEY_INDEX;

fn solve_key_index() -> IndexCreateStatement {
    Index::create()
        .if_not_exists()
        .unique()
        .name(SOLVE_KEY_INDEX)
        .table(solve::Entity)
        .col(solve::Column::CompetitionId)
        .col(solve::Column::ExerciseId)
        .col(solve::Column::EntityKind)
        .col(solve::Column::EntityId)
        .to_owned()
}

/// Ensure required database indexes exist.
///
/// Schema sync only knows single-column uniqueness, so the composite
/// indexes are created here on startup. The solve key index is what makes
/// credit exactly-once; failing to create it is fatal. The others only
/// speed up reads and just log a warning.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared(&solve_key_index().to_string(PostgresQueryBuilder))
        .await?;
    info!("Ensured index {} exists", SOLVE_KEY_INDEX);

    // Listing a user's solves:
    // SELECT * FROM solve WHERE user_id = ? ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_solve_user_created")
        .table(solve::Entity)
        .col(solve::Column::UserId)
        .col(solve::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);
    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_solve_user_created exists"),
        Err(e) => warn!("Failed to create index idx_solve_user_created: {}", e),
    }

    // Team scoreboard reads
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_team_competition")
        .table(team::Entity)
        .col(team::Column::CompetitionId)
        .to_string(PostgresQueryBuilder);
    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_team_competition exists"),
        Err(e) => warn!("Failed to create index idx_team_competition: {}", e),
    }

    Ok(())
}
