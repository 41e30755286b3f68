use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A challenge container started by the external orchestrator.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "container")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub exercise_id: i32,
    #[sea_orm(belongs_to, from = "exercise_id", to = "id")]
    pub exercise: HasOne<super::exercise::Entity>,

    pub docker_id: String,
    pub image_tag: String,
    pub port: i32,
    /// e.g. `nc 10.0.0.5 1337` or an URL
    pub connection: String,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
