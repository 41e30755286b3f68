use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use super::competition::find_competition;
use super::user::find_user;
use crate::entity::attendance;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::params::AppPath;
use crate::models::attendance::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Attendance",
    operation_id = "recordAttendance",
    summary = "Record attendance",
    request_body = RecordAttendanceRequest,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceResponse),
        (status = 404, description = "User or competition not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = payload.user_id, competition_id = payload.competition_id))]
pub async fn record_attendance(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RecordAttendanceRequest>,
) -> Result<impl IntoResponse, AppError> {
    find_user(&state.db, payload.user_id).await?;
    find_competition(&state.db, payload.competition_id).await?;

    let model = attendance::ActiveModel {
        user_id: Set(payload.user_id),
        competition_id: Set(payload.competition_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(AttendanceResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{user_id}",
    tag = "Attendance",
    operation_id = "listUserAttendance",
    summary = "Attendance log of a user",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Attendance records, newest first", body = Vec<AttendanceResponse>),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(user_id))]
pub async fn list_user_attendance(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i32>,
) -> Result<Json<Vec<AttendanceResponse>>, AppError> {
    find_user(&state.db, user_id).await?;

    let rows = attendance::Entity::find()
        .filter(attendance::Column::UserId.eq(user_id))
        .order_by_desc(attendance::Column::CreatedAt)
        .order_by_desc(attendance::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
