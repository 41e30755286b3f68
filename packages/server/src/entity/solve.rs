use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::competition::ScoringMode;

/// An accepted flag submission.
///
/// Rows are only ever inserted. `(competition_id, exercise_id, entity_kind,
/// entity_id)` is covered by the `uq_solve_entity_exercise` unique index
/// created in `seed::ensure_indexes`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "solve")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub competition_id: i32,
    #[sea_orm(belongs_to, from = "competition_id", to = "id")]
    pub competition: HasOne<super::competition::Entity>,

    pub exercise_id: i32,
    #[sea_orm(belongs_to, from = "exercise_id", to = "id")]
    pub exercise: HasOne<super::exercise::Entity>,

    /// The user who submitted the flag.
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    /// Whether `entity_id` refers to a team or a user.
    pub entity_kind: ScoringMode,
    pub entity_id: i32,

    pub points_awarded: i32,
    pub content: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
