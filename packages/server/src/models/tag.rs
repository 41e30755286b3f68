use serde::{Deserialize, Serialize};

use super::shared::validate_name;
use crate::entity::tag;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTagRequest {
    #[schema(example = "web")]
    pub name: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
}

impl From<tag::Model> for TagResponse {
    fn from(m: tag::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

pub fn validate_create_tag(req: &CreateTagRequest) -> Result<(), AppError> {
    validate_name(&req.name, "Tag name", 32)
}
