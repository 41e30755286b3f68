use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "team")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub competition_id: i32,
    #[sea_orm(belongs_to, from = "competition_id", to = "id")]
    pub competition: HasOne<super::competition::Entity>,

    pub creator_id: i32,

    /// Cached sum of `solve.points_awarded` for this team. Only ever changed
    /// by an atomic add in the same transaction as the solve insert.
    #[sea_orm(default_value = 0)]
    pub score: i64,

    #[sea_orm(has_many)]
    pub members: HasMany<super::team_member::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
