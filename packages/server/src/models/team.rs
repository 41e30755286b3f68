use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::validate_name;
use crate::entity::team;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTeamRequest {
    #[schema(example = "T1")]
    pub name: String,
    /// Becomes the first member of the team.
    #[schema(example = 7)]
    pub creator_id: i32,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct JoinTeamRequest {
    #[schema(example = 8)]
    pub user_id: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamResponse {
    pub id: i32,
    pub name: String,
    pub competition_id: i32,
    pub creator_id: i32,
    #[schema(example = 100)]
    pub score: i64,
    pub member_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
}

impl TeamResponse {
    pub fn new(m: team::Model, member_ids: Vec<i32>) -> Self {
        Self {
            id: m.id,
            name: m.name,
            competition_id: m.competition_id,
            creator_id: m.creator_id,
            score: m.score,
            member_ids,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_team(req: &CreateTeamRequest) -> Result<(), AppError> {
    validate_name(&req.name, "Team name", 64)
}
