use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument};

use super::exercise::find_exercise;
use crate::entity::container;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::params::AppPath;
use crate::models::container::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Containers",
    operation_id = "listContainers",
    summary = "List container records",
    description = "Every container record, active or not, ordered by id.",
    responses((status = 200, description = "Container records", body = Vec<ContainerResponse>)),
)]
#[instrument(skip(state))]
pub async fn list_containers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContainerResponse>>, AppError> {
    let rows = container::Entity::find()
        .order_by_asc(container::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Containers",
    operation_id = "createContainer",
    summary = "Record a started container",
    request_body = CreateContainerRequest,
    responses(
        (status = 201, description = "Container recorded as active", body = ContainerResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Exercise not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(exercise_id = payload.exercise_id))]
pub async fn create_container(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateContainerRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_container(&payload)?;
    find_exercise(&state.db, payload.exercise_id).await?;

    let model = container::ActiveModel {
        exercise_id: Set(payload.exercise_id),
        docker_id: Set(payload.docker_id.trim().to_string()),
        image_tag: Set(payload.image_tag.trim().to_string()),
        port: Set(payload.port),
        connection: Set(payload.connection.trim().to_string()),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(container_id = model.id, "Container recorded");
    Ok((StatusCode::CREATED, Json(ContainerResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Containers",
    operation_id = "getContainer",
    summary = "Get a container record",
    params(("id" = i32, Path, description = "Container ID")),
    responses(
        (status = 200, description = "Container record", body = ContainerResponse),
        (status = 404, description = "Container not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_container(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ContainerResponse>, AppError> {
    let model = container::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Container not found".into()))?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/exercise/{exercise_id}",
    tag = "Containers",
    operation_id = "getActiveContainer",
    summary = "Active container of an exercise",
    description = "Returns the most recently recorded active container for the exercise.",
    params(("exercise_id" = i32, Path, description = "Exercise ID")),
    responses(
        (status = 200, description = "Active container", body = ContainerResponse),
        (status = 404, description = "No active container (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(exercise_id))]
pub async fn get_active_container(
    State(state): State<AppState>,
    AppPath(exercise_id): AppPath<i32>,
) -> Result<Json<ContainerResponse>, AppError> {
    let model = container::Entity::find()
        .filter(container::Column::ExerciseId.eq(exercise_id))
        .filter(container::Column::IsActive.eq(true))
        .order_by_desc(container::Column::CreatedAt)
        .order_by_desc(container::Column::Id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No active container for this exercise".into()))?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Containers",
    operation_id = "deleteContainer",
    summary = "Delete a container record",
    params(("id" = i32, Path, description = "Container ID")),
    responses(
        (status = 204, description = "Container record deleted"),
        (status = 404, description = "Container not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_container(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let result = container::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Container not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
