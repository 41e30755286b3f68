use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_name};
use crate::entity::competition::{self, CompetitionStatus, ScoringMode};
use crate::error::AppError;

const INVITE_CODE_LEN: usize = 8;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCompetitionRequest {
    #[schema(example = "ctf1")]
    pub name: String,
    #[schema(example = "Security Club")]
    pub organizer: String,
    /// Generated when omitted.
    pub invite_code: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Defaults to `created`.
    pub status: Option<CompetitionStatus>,
    /// Who gets credited for solves. Cannot be changed later.
    pub scoring_mode: ScoringMode,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateCompetitionRequest {
    pub name: Option<String>,
    pub organizer: Option<String>,
    pub invite_code: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<CompetitionStatus>,
    /// Accepted only if equal to the current mode.
    pub scoring_mode: Option<ScoringMode>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompetitionListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    pub status: Option<CompetitionStatus>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterUserRequest {
    #[schema(example = 7)]
    pub user_id: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompetitionResponse {
    pub id: i32,
    pub name: String,
    pub organizer: String,
    pub invite_code: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: CompetitionStatus,
    pub scoring_mode: ScoringMode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<competition::Model> for CompetitionResponse {
    fn from(m: competition::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            organizer: m.organizer,
            invite_code: m.invite_code,
            start_date: m.start_date,
            end_date: m.end_date,
            status: m.status,
            scoring_mode: m.scoring_mode,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompetitionListResponse {
    pub data: Vec<CompetitionResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RegistrationResponse {
    pub competition_id: i32,
    pub user_id: i32,
    pub username: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompetitionExerciseResponse {
    pub competition_id: i32,
    pub exercise_id: i32,
    pub linked_at: DateTime<Utc>,
}

pub fn generate_invite_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(INVITE_CODE_LEN)
        .map(char::from)
        .collect()
}

fn validate_invite_code(code: &str) -> Result<(), AppError> {
    let code = code.trim();
    if code.len() < 4 || code.len() > 32 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::Validation(
            "Invite code must be 4-32 ASCII letters or digits".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_competition(req: &CreateCompetitionRequest) -> Result<(), AppError> {
    validate_name(&req.name, "Name", 128)?;
    validate_name(&req.organizer, "Organizer", 128)?;
    if let Some(ref code) = req.invite_code {
        validate_invite_code(code)?;
    }
    if req.end_date <= req.start_date {
        return Err(AppError::Validation(
            "end_date must be after start_date".into(),
        ));
    }
    Ok(())
}

pub fn validate_update_competition(req: &UpdateCompetitionRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "Name", 128)?;
    }
    if let Some(ref organizer) = req.organizer {
        validate_name(organizer, "Organizer", 128)?;
    }
    if let Some(ref code) = req.invite_code {
        validate_invite_code(code)?;
    }
    if let (Some(start), Some(end)) = (req.start_date, req.end_date)
        && end <= start
    {
        return Err(AppError::Validation(
            "end_date must be after start_date".into(),
        ));
    }
    Ok(())
}
