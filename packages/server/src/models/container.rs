use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::validate_name;
use crate::entity::container;
use crate::error::AppError;

/// Container record reported by the orchestrator after it starts an instance.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateContainerRequest {
    pub exercise_id: i32,
    pub docker_id: String,
    pub image_tag: String,
    #[schema(example = 1337)]
    pub port: i32,
    #[schema(example = "nc 10.0.0.5 1337")]
    pub connection: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContainerResponse {
    pub id: i32,
    pub exercise_id: i32,
    pub docker_id: String,
    pub image_tag: String,
    pub port: i32,
    pub connection: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<container::Model> for ContainerResponse {
    fn from(m: container::Model) -> Self {
        Self {
            id: m.id,
            exercise_id: m.exercise_id,
            docker_id: m.docker_id,
            image_tag: m.image_tag,
            port: m.port,
            connection: m.connection,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_container(req: &CreateContainerRequest) -> Result<(), AppError> {
    validate_name(&req.docker_id, "docker_id", 128)?;
    validate_name(&req.image_tag, "image_tag", 256)?;
    validate_name(&req.connection, "connection", 256)?;
    if !(1..=65535).contains(&req.port) {
        return Err(AppError::Validation("Port must be 1-65535".into()));
    }
    Ok(())
}
