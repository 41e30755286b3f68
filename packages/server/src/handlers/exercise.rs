use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{
    competition, competition_exercise, container, exercise, exercise_tag, solve, tag,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::params::{AppPath, AppQuery};
use crate::models::exercise::*;
use crate::models::shared::{Pagination, escape_like, page_bounds};
use crate::scoring::aggregate;
use crate::state::AppState;

pub(crate) async fn find_exercise<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<exercise::Model, AppError> {
    exercise::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Exercise not found".into()))
}

/// Tag names per exercise id, sorted by name.
pub(crate) async fn tags_for_exercises<C: ConnectionTrait>(
    db: &C,
    exercise_ids: &[i32],
) -> Result<HashMap<i32, Vec<String>>, DbErr> {
    if exercise_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = exercise_tag::Entity::find()
        .filter(exercise_tag::Column::ExerciseId.is_in(exercise_ids.iter().copied()))
        .find_also_related(tag::Entity)
        .all(db)
        .await?;

    let mut by_exercise: HashMap<i32, Vec<String>> = HashMap::new();
    for (link, tag) in rows {
        if let Some(tag) = tag {
            by_exercise.entry(link.exercise_id).or_default().push(tag.name);
        }
    }
    for names in by_exercise.values_mut() {
        names.sort();
    }
    Ok(by_exercise)
}

async fn exercise_response<C: ConnectionTrait>(
    db: &C,
    model: exercise::Model,
) -> Result<ExerciseResponse, AppError> {
    let tags = tags_for_exercises(db, &[model.id])
        .await?
        .remove(&model.id)
        .unwrap_or_default();
    Ok(ExerciseResponse::new(model, tags))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Exercises",
    operation_id = "createExercise",
    summary = "Create an exercise",
    request_body = CreateExerciseRequest,
    responses(
        (status = 201, description = "Exercise created", body = ExerciseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_exercise(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateExerciseRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_exercise(&payload)?;

    let now = chrono::Utc::now();
    let model = exercise::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        category: Set(payload.category.trim().to_string()),
        difficulty: Set(payload.difficulty.trim().to_string()),
        flag: Set(payload.flag),
        points: Set(payload.points),
        image_tag: Set(payload.image_tag),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ExerciseResponse::new(model, Vec::new())),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Exercises",
    operation_id = "listExercises",
    summary = "List exercises",
    description = "Paginated list ordered by id. Filters combine with AND. Flags are never included.",
    params(ExerciseListQuery),
    responses(
        (status = 200, description = "List of exercises", body = ExerciseListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_exercises(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ExerciseListQuery>,
) -> Result<Json<ExerciseListResponse>, AppError> {
    let (page, per_page) = page_bounds(query.page, query.per_page);

    let mut select = exercise::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(exercise::Column::Name)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }
    if let Some(ref category) = query.category {
        select = select.filter(exercise::Column::Category.eq(category.trim()));
    }
    if let Some(ref difficulty) = query.difficulty {
        select = select.filter(exercise::Column::Difficulty.eq(difficulty.trim()));
    }
    if let Some(tag_id) = query.tag_id {
        select = select.filter(
            exercise::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(exercise_tag::Column::ExerciseId)
                    .from(exercise_tag::Entity)
                    .and_where(exercise_tag::Column::TagId.eq(tag_id))
                    .to_owned(),
            ),
        );
    }

    let paginator = select
        .order_by_asc(exercise::Column::Id)
        .paginate(&state.db, per_page);
    let total = paginator.num_items().await?;
    let models = paginator.fetch_page(page - 1).await?;

    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let mut tags = tags_for_exercises(&state.db, &ids).await?;
    let data = models
        .into_iter()
        .map(|m| {
            let names = tags.remove(&m.id).unwrap_or_default();
            ExerciseResponse::new(m, names)
        })
        .collect();

    Ok(Json(ExerciseListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Exercises",
    operation_id = "getExercise",
    summary = "Get an exercise by ID",
    params(("id" = i32, Path, description = "Exercise ID")),
    responses(
        (status = 200, description = "Exercise details, flag omitted", body = ExerciseResponse),
        (status = 404, description = "Exercise not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_exercise(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ExerciseResponse>, AppError> {
    let model = find_exercise(&state.db, id).await?;
    Ok(Json(exercise_response(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Exercises",
    operation_id = "updateExercise",
    summary = "Update an exercise",
    description = "Partially updates an exercise. Changing `points` or `is_active` affects future solves only. The flag cannot be changed while any competition the exercise is linked to is running.",
    params(("id" = i32, Path, description = "Exercise ID")),
    request_body = UpdateExerciseRequest,
    responses(
        (status = 200, description = "Exercise updated", body = ExerciseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Exercise not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Flag change during a running competition (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_exercise(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateExerciseRequest>,
) -> Result<Json<ExerciseResponse>, AppError> {
    validate_update_exercise(&payload)?;

    if payload == UpdateExerciseRequest::default() {
        let model = find_exercise(&state.db, id).await?;
        return Ok(Json(exercise_response(&state.db, model).await?));
    }

    let txn = state.db.begin().await?;
    let existing = find_exercise(&txn, id).await?;

    if let Some(ref flag) = payload.flag
        && *flag != existing.flag
    {
        let now = chrono::Utc::now();
        let running = competition_exercise::Entity::find()
            .filter(competition_exercise::Column::ExerciseId.eq(id))
            .find_also_related(competition::Entity)
            .all(&txn)
            .await?
            .into_iter()
            .filter_map(|(_, c)| c)
            .any(|c| c.is_running_at(now));
        if running {
            return Err(AppError::Conflict(
                "Flag cannot change while a linked competition is running".into(),
            ));
        }
    }

    let mut active: exercise::ActiveModel = existing.into();
    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(ref category) = payload.category {
        active.category = Set(category.trim().to_string());
    }
    if let Some(ref difficulty) = payload.difficulty {
        active.difficulty = Set(difficulty.trim().to_string());
    }
    if let Some(flag) = payload.flag {
        active.flag = Set(flag);
    }
    if let Some(points) = payload.points {
        active.points = Set(points);
    }
    if let Some(image_tag) = payload.image_tag {
        active.image_tag = Set(image_tag);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    let response = exercise_response(&txn, model).await?;
    txn.commit().await?;

    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Exercises",
    operation_id = "deleteExercise",
    summary = "Delete an exercise",
    description = "Deletes the exercise with its solves, containers, competition links and tag links in one transaction. Points of the deleted solves are taken back from team scores.",
    params(("id" = i32, Path, description = "Exercise ID")),
    responses(
        (status = 204, description = "Exercise deleted"),
        (status = 404, description = "Exercise not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_exercise(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_exercise(&txn, id).await?;

    let solves = solve::Entity::find()
        .filter(solve::Column::ExerciseId.eq(id))
        .all(&txn)
        .await?;
    aggregate::revoke_solves(&txn, &solves).await?;

    solve::Entity::delete_many()
        .filter(solve::Column::ExerciseId.eq(id))
        .exec(&txn)
        .await?;
    container::Entity::delete_many()
        .filter(container::Column::ExerciseId.eq(id))
        .exec(&txn)
        .await?;
    competition_exercise::Entity::delete_many()
        .filter(competition_exercise::Column::ExerciseId.eq(id))
        .exec(&txn)
        .await?;
    exercise_tag::Entity::delete_many()
        .filter(exercise_tag::Column::ExerciseId.eq(id))
        .exec(&txn)
        .await?;
    exercise::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    info!(revoked_solves = solves.len(), "Exercise deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/tags/{tag_id}",
    tag = "Exercises",
    operation_id = "tagExercise",
    summary = "Attach a tag to an exercise",
    params(
        ("id" = i32, Path, description = "Exercise ID"),
        ("tag_id" = i32, Path, description = "Tag ID"),
    ),
    responses(
        (status = 201, description = "Tag attached", body = ExerciseResponse),
        (status = 404, description = "Exercise or tag not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Tag already attached (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id, tag_id))]
pub async fn add_tag(
    State(state): State<AppState>,
    AppPath((id, tag_id)): AppPath<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let model = find_exercise(&txn, id).await?;
    tag::Entity::find_by_id(tag_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".into()))?;

    let link = exercise_tag::ActiveModel {
        exercise_id: Set(id),
        tag_id: Set(tag_id),
    };
    match link.insert(&txn).await {
        Ok(_) => {
            let response = exercise_response(&txn, model).await?;
            txn.commit().await?;
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(AppError::Conflict("Tag is already attached".into()))
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    delete,
    path = "/{id}/tags/{tag_id}",
    tag = "Exercises",
    operation_id = "untagExercise",
    summary = "Detach a tag from an exercise",
    params(
        ("id" = i32, Path, description = "Exercise ID"),
        ("tag_id" = i32, Path, description = "Tag ID"),
    ),
    responses(
        (status = 204, description = "Tag detached"),
        (status = 404, description = "Tag not attached (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id, tag_id))]
pub async fn remove_tag(
    State(state): State<AppState>,
    AppPath((id, tag_id)): AppPath<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let result = exercise_tag::Entity::delete_by_id((id, tag_id))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Tag is not attached to this exercise".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
