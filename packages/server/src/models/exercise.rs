use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, double_option, validate_name, validate_points};
use crate::entity::exercise;
use crate::error::AppError;
use crate::scoring::validator::MAX_FLAG_LEN;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateExerciseRequest {
    #[schema(example = "pwn1")]
    pub name: String,
    /// Markdown.
    pub description: Option<String>,
    #[schema(example = "pwn")]
    pub category: String,
    #[schema(example = "easy")]
    pub difficulty: String,
    #[schema(example = "CTF{buffer_overflow}")]
    pub flag: String,
    #[schema(example = 100)]
    pub points: i32,
    pub image_tag: Option<String>,
    /// Defaults to `true`.
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateExerciseRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    /// Rejected while the exercise is linked to a running competition.
    pub flag: Option<String>,
    /// Applies to future solves only.
    pub points: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub image_tag: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExerciseListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    /// Only exercises carrying this tag id.
    pub tag_id: Option<i32>,
}

/// Public view of an exercise. The flag is never included.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ExerciseResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub difficulty: String,
    pub points: i32,
    pub image_tag: Option<String>,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExerciseResponse {
    pub fn new(m: exercise::Model, tags: Vec<String>) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            category: m.category,
            difficulty: m.difficulty,
            points: m.points,
            image_tag: m.image_tag,
            is_active: m.is_active,
            tags,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ExerciseListResponse {
    pub data: Vec<ExerciseResponse>,
    pub pagination: Pagination,
}

fn validate_flag(flag: &str) -> Result<(), AppError> {
    // Submissions are trimmed before comparison, so a padded flag could never match.
    if flag.is_empty() || flag.trim() != flag || flag.len() > MAX_FLAG_LEN {
        return Err(AppError::Validation(format!(
            "Flag must be 1-{MAX_FLAG_LEN} bytes without surrounding whitespace"
        )));
    }
    Ok(())
}

pub fn validate_create_exercise(req: &CreateExerciseRequest) -> Result<(), AppError> {
    validate_name(&req.name, "Name", 128)?;
    validate_name(&req.category, "Category", 64)?;
    validate_name(&req.difficulty, "Difficulty", 32)?;
    validate_flag(&req.flag)?;
    validate_points(req.points)
}

pub fn validate_update_exercise(req: &UpdateExerciseRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "Name", 128)?;
    }
    if let Some(ref category) = req.category {
        validate_name(category, "Category", 64)?;
    }
    if let Some(ref difficulty) = req.difficulty {
        validate_name(difficulty, "Difficulty", 32)?;
    }
    if let Some(ref flag) = req.flag {
        validate_flag(flag)?;
    }
    if let Some(points) = req.points {
        validate_points(points)?;
    }
    Ok(())
}
