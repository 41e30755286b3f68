use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "competition_exercise")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub competition_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub exercise_id: i32,
    #[sea_orm(belongs_to, from = "competition_id", to = "id")]
    pub competition: HasOne<super::competition::Entity>,
    #[sea_orm(belongs_to, from = "exercise_id", to = "id")]
    pub exercise: HasOne<super::exercise::Entity>,

    pub linked_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
