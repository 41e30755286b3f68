//! Score per scoring entity.
//!
//! The strategy is picked by scoring mode and nothing else:
//!
//! * team mode keeps a cached counter in `team.score`, changed only by an
//!   atomic `score = score + delta` inside the transaction that writes or
//!   removes the solves;
//! * user mode has no cache and always sums `solve.points_awarded`.

use std::collections::HashMap;

use sea_orm::prelude::Expr;
use sea_orm::sea_query::{ExprTrait, Func};
use sea_orm::*;

use super::identity::ScoringEntity;
use crate::entity::competition::{self, ScoringMode};
use crate::entity::{solve, team};

/// Add `delta` to the entity's aggregate.
///
/// Must run on the same transaction as the solve insert it accounts for.
pub async fn increment_aggregate_score<C: ConnectionTrait>(
    db: &C,
    entity: ScoringEntity,
    delta: i64,
) -> Result<(), DbErr> {
    match entity {
        ScoringEntity::Team(team_id) => {
            let result = team::Entity::update_many()
                .col_expr(
                    team::Column::Score,
                    Expr::col(team::Column::Score).add(delta),
                )
                .filter(team::Column::Id.eq(team_id))
                .exec(db)
                .await?;
            if result.rows_affected != 1 {
                return Err(DbErr::RecordNotUpdated);
            }
            Ok(())
        }
        // Derived on read.
        ScoringEntity::User(_) => Ok(()),
    }
}

/// Take back the points of solves that are about to be deleted.
///
/// Call inside the deleting transaction, before the rows go away.
pub async fn revoke_solves<C: ConnectionTrait>(
    db: &C,
    solves: &[solve::Model],
) -> Result<(), DbErr> {
    let mut per_team: HashMap<i32, i64> = HashMap::new();
    for s in solves {
        if s.entity_kind == ScoringMode::Team {
            *per_team.entry(s.entity_id).or_default() += i64::from(s.points_awarded);
        }
    }

    for (team_id, points) in per_team {
        // The team itself may already be gone; nothing to correct then.
        team::Entity::update_many()
            .col_expr(
                team::Column::Score,
                Expr::col(team::Column::Score).sub(points),
            )
            .filter(team::Column::Id.eq(team_id))
            .exec(db)
            .await?;
    }
    Ok(())
}

/// `SUM(points_awarded)` per entity over the competition's solves.
pub async fn sum_points_per_entity<C: ConnectionTrait>(
    db: &C,
    competition_id: i32,
    kind: ScoringMode,
) -> Result<HashMap<i32, i64>, DbErr> {
    let rows: Vec<(i32, i64)> = solve::Entity::find()
        .select_only()
        .column(solve::Column::EntityId)
        .column_as(
            Expr::expr(Func::sum(Expr::col(solve::Column::PointsAwarded))),
            "score",
        )
        .filter(solve::Column::CompetitionId.eq(competition_id))
        .filter(solve::Column::EntityKind.eq(kind))
        .group_by(solve::Column::EntityId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows.into_iter().collect())
}

/// Current score of every entity with a non-zero aggregate in the competition,
/// read with the competition's strategy.
pub async fn scores_for_competition<C: ConnectionTrait>(
    db: &C,
    competition: &competition::Model,
) -> Result<HashMap<i32, i64>, DbErr> {
    match competition.scoring_mode {
        ScoringMode::Team => {
            let rows: Vec<(i32, i64)> = team::Entity::find()
                .select_only()
                .column(team::Column::Id)
                .column(team::Column::Score)
                .filter(team::Column::CompetitionId.eq(competition.id))
                .into_tuple()
                .all(db)
                .await?;
            Ok(rows.into_iter().collect())
        }
        ScoringMode::User => {
            sum_points_per_entity(db, competition.id, ScoringMode::User).await
        }
    }
}

/// Score of a single entity, read with its mode's strategy.
pub async fn aggregate_score<C: ConnectionTrait>(
    db: &C,
    competition_id: i32,
    entity: ScoringEntity,
) -> Result<i64, DbErr> {
    match entity {
        ScoringEntity::Team(team_id) => {
            let team = team::Entity::find_by_id(team_id)
                .one(db)
                .await?
                .ok_or(DbErr::RecordNotFound(format!("team {team_id}")))?;
            Ok(team.score)
        }
        ScoringEntity::User(user_id) => {
            let sums = sum_points_per_entity(db, competition_id, ScoringMode::User).await?;
            Ok(sums.get(&user_id).copied().unwrap_or(0))
        }
    }
}
