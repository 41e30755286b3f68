use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entity::competition::ScoringMode;
use crate::entity::{
    competition, competition_exercise, competition_user, exercise, team, team_member, user,
};

/// The unit credited with points for a solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScoringEntity {
    Team(i32),
    User(i32),
}

impl ScoringEntity {
    pub fn kind(&self) -> ScoringMode {
        match self {
            Self::Team(_) => ScoringMode::Team,
            Self::User(_) => ScoringMode::User,
        }
    }

    pub fn id(&self) -> i32 {
        match *self {
            Self::Team(id) | Self::User(id) => id,
        }
    }

    pub fn new(kind: ScoringMode, id: i32) -> Self {
        match kind {
            ScoringMode::Team => Self::Team(id),
            ScoringMode::User => Self::User(id),
        }
    }
}

/// A scoring entity registered in a competition, as shown on the scoreboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityRef {
    pub entity_id: i32,
    pub name: String,
}

pub async fn get_exercise<C: ConnectionTrait>(
    db: &C,
    exercise_id: i32,
) -> Result<Option<exercise::Model>, DbErr> {
    exercise::Entity::find_by_id(exercise_id).one(db).await
}

pub async fn get_competition<C: ConnectionTrait>(
    db: &C,
    competition_id: i32,
) -> Result<Option<competition::Model>, DbErr> {
    competition::Entity::find_by_id(competition_id).one(db).await
}

pub async fn is_exercise_linked_to_competition<C: ConnectionTrait>(
    db: &C,
    exercise_id: i32,
    competition_id: i32,
) -> Result<bool, DbErr> {
    Ok(
        competition_exercise::Entity::find_by_id((competition_id, exercise_id))
            .one(db)
            .await?
            .is_some(),
    )
}

/// Resolve who gets credited when `actor_id` scores in `competition`.
///
/// Team mode: the team the actor joined in this competition.
/// User mode: the actor, if individually registered.
pub async fn scoring_entity_for_actor<C: ConnectionTrait>(
    db: &C,
    actor_id: i32,
    competition: &competition::Model,
) -> Result<Option<ScoringEntity>, DbErr> {
    match competition.scoring_mode {
        ScoringMode::Team => {
            let membership = team_member::Entity::find_by_id((competition.id, actor_id))
                .one(db)
                .await?;
            Ok(membership.map(|m| ScoringEntity::Team(m.team_id)))
        }
        ScoringMode::User => {
            let registration = competition_user::Entity::find_by_id((competition.id, actor_id))
                .one(db)
                .await?;
            Ok(registration.map(|_| ScoringEntity::User(actor_id)))
        }
    }
}

/// Every entity that belongs on the competition's scoreboard, solved anything or not.
pub async fn list_scoring_entities<C: ConnectionTrait>(
    db: &C,
    competition: &competition::Model,
) -> Result<Vec<EntityRef>, DbErr> {
    match competition.scoring_mode {
        ScoringMode::Team => {
            let teams = team::Entity::find()
                .filter(team::Column::CompetitionId.eq(competition.id))
                .order_by_asc(team::Column::Id)
                .all(db)
                .await?;
            Ok(teams
                .into_iter()
                .map(|t| EntityRef {
                    entity_id: t.id,
                    name: t.name,
                })
                .collect())
        }
        ScoringMode::User => {
            let rows = competition_user::Entity::find()
                .filter(competition_user::Column::CompetitionId.eq(competition.id))
                .find_also_related(user::Entity)
                .all(db)
                .await?;
            Ok(rows
                .into_iter()
                .filter_map(|(registration, user)| {
                    user.map(|u| EntityRef {
                        entity_id: registration.user_id,
                        name: u.username,
                    })
                })
                .collect())
        }
    }
}
