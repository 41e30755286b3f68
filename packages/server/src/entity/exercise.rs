use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exercise")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>, // in Markdown
    pub category: String,
    pub difficulty: String,

    /// Secret compared against trimmed submissions. Never serialized to clients.
    pub flag: String,
    pub points: i32,

    pub image_tag: Option<String>,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    #[sea_orm(has_many)]
    pub containers: HasMany<super::container::Entity>,

    #[sea_orm(has_many)]
    pub solves: HasMany<super::solve::Entity>,

    #[sea_orm(has_many, via = "competition_exercise")]
    pub competitions: HasMany<super::competition::Entity>,

    #[sea_orm(has_many, via = "exercise_tag")]
    pub tags: HasMany<super::tag::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
