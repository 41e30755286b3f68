use std::fmt;

use sea_orm::entity::prelude::*;
use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};

/// Which kind of entity is credited for a solve in a competition.
///
/// Fixed when the competition is created.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    DeriveActiveEnum,
    EnumIter,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Points go to the team the actor belongs to.
    #[sea_orm(string_value = "team")]
    Team,
    /// Points go to the actor, who must be registered individually.
    #[sea_orm(string_value = "user")]
    User,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::User => "user",
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Administrative lifecycle label of a competition.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    DeriveActiveEnum,
    EnumIter,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum CompetitionStatus {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "running")]
    Running,
    #[sea_orm(string_value = "finished")]
    Finished,
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "competition")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub organizer: String,
    #[sea_orm(unique)]
    pub invite_code: String,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub status: CompetitionStatus,
    pub scoring_mode: ScoringMode,

    #[sea_orm(has_many)]
    pub teams: HasMany<super::team::Entity>,

    #[sea_orm(has_many)]
    pub team_members: HasMany<super::team_member::Entity>,

    #[sea_orm(has_many)]
    pub solves: HasMany<super::solve::Entity>,

    #[sea_orm(has_many)]
    pub attendances: HasMany<super::attendance::Entity>,

    #[sea_orm(has_many, via = "competition_user")]
    pub users: HasMany<super::user::Entity>,

    #[sea_orm(has_many, via = "competition_exercise")]
    pub exercises: HasMany<super::exercise::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// True while `now` falls inside the scheduled window.
    pub fn is_running_at(&self, now: DateTimeUtc) -> bool {
        self.start_date <= now && now <= self.end_date
    }
}

impl ActiveModelBehavior for ActiveModel {}
