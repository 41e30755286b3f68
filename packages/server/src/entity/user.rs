use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC string.
    pub password: String,
    pub phone_number: Option<String>,
    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    #[sea_orm(has_many)]
    pub solves: HasMany<super::solve::Entity>,

    #[sea_orm(has_many)]
    pub attendances: HasMany<super::attendance::Entity>,

    #[sea_orm(has_many)]
    pub team_memberships: HasMany<super::team_member::Entity>,

    #[sea_orm(has_many, via = "competition_user")]
    pub competitions: HasMany<super::competition::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
