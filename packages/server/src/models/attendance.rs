use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::attendance;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RecordAttendanceRequest {
    pub user_id: i32,
    pub competition_id: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AttendanceResponse {
    pub id: i32,
    pub user_id: i32,
    pub competition_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<attendance::Model> for AttendanceResponse {
    fn from(m: attendance::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            competition_id: m.competition_id,
            created_at: m.created_at,
        }
    }
}
