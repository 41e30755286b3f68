use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::debug;

use super::identity::ScoringEntity;
use crate::entity::solve;

/// Name of the unique index that makes credit exactly-once.
pub const SOLVE_KEY_INDEX: &str = "uq_solve_entity_exercise";

/// A solve about to be written to the ledger.
#[derive(Clone, Debug)]
pub struct NewSolve {
    pub actor_id: i32,
    pub entity: ScoringEntity,
    pub exercise_id: i32,
    pub competition_id: i32,
    pub points: i32,
    pub content: String,
}

#[derive(Debug)]
pub enum InsertOutcome {
    Inserted(solve::Model),
    AlreadyExists,
}

/// Look up the solve for a (entity, exercise, competition) key.
pub async fn find_solve<C: ConnectionTrait>(
    db: &C,
    entity: ScoringEntity,
    exercise_id: i32,
    competition_id: i32,
) -> Result<Option<solve::Model>, DbErr> {
    solve::Entity::find()
        .filter(solve::Column::CompetitionId.eq(competition_id))
        .filter(solve::Column::ExerciseId.eq(exercise_id))
        .filter(solve::Column::EntityKind.eq(entity.kind()))
        .filter(solve::Column::EntityId.eq(entity.id()))
        .one(db)
        .await
}

/// Insert a solve unless one already exists for its key.
///
/// Uses `ON CONFLICT DO NOTHING` against the solve key index, so a concurrent
/// writer that loses the race gets `AlreadyExists` without aborting the
/// surrounding transaction.
pub async fn insert_solve_if_absent<C: ConnectionTrait>(
    db: &C,
    new_solve: NewSolve,
) -> Result<InsertOutcome, DbErr> {
    let NewSolve {
        actor_id,
        entity,
        exercise_id,
        competition_id,
        points,
        content,
    } = new_solve;

    let model = solve::ActiveModel {
        competition_id: Set(competition_id),
        exercise_id: Set(exercise_id),
        user_id: Set(actor_id),
        entity_kind: Set(entity.kind()),
        entity_id: Set(entity.id()),
        points_awarded: Set(points),
        content: Set(content),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = solve::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([
                solve::Column::CompetitionId,
                solve::Column::ExerciseId,
                solve::Column::EntityKind,
                solve::Column::EntityId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => {
            debug!(
                competition_id,
                exercise_id,
                entity_id = entity.id(),
                "Solve key already taken"
            );
            Ok(InsertOutcome::AlreadyExists)
        }
        Ok(_) => {
            let inserted = find_solve(db, entity, exercise_id, competition_id)
                .await?
                .ok_or(DbErr::RecordNotFound(
                    "solve missing right after insert".into(),
                ))?;
            Ok(InsertOutcome::Inserted(inserted))
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Ok(InsertOutcome::AlreadyExists)
        }
        Err(e) => Err(e),
    }
}

/// Solves credited to one user as actor, newest first.
pub async fn solves_by_actor<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<solve::Model>, DbErr> {
    solve::Entity::find()
        .filter(solve::Column::UserId.eq(user_id))
        .order_by_desc(solve::Column::CreatedAt)
        .order_by_desc(solve::Column::Id)
        .all(db)
        .await
}

/// All solves in a competition, oldest first.
pub async fn solves_in_competition<C: ConnectionTrait>(
    db: &C,
    competition_id: i32,
) -> Result<Vec<solve::Model>, DbErr> {
    solve::Entity::find()
        .filter(solve::Column::CompetitionId.eq(competition_id))
        .order_by_asc(solve::Column::CreatedAt)
        .order_by_asc(solve::Column::Id)
        .all(db)
        .await
}
