use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::{info, instrument};

use super::exercise::{find_exercise, tags_for_exercises};
use super::user::find_user;
use crate::entity::{
    attendance, competition, competition_exercise, competition_user, exercise, solve, team,
    team_member,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::params::{AppPath, AppQuery};
use crate::models::competition::*;
use crate::models::exercise::ExerciseResponse;
use crate::models::shared::{Pagination, escape_like, page_bounds};
use crate::state::AppState;

pub(crate) async fn find_competition<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<competition::Model, AppError> {
    competition::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Competition not found".into()))
}

fn invite_code_conflict(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Invite code is already in use".into())
        }
        _ => AppError::from(e),
    }
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Competitions",
    operation_id = "createCompetition",
    summary = "Create a competition",
    description = "Creates a competition. `scoring_mode` decides whether solves credit teams or individual users and cannot be changed afterwards. An invite code is generated when none is given.",
    request_body = CreateCompetitionRequest,
    responses(
        (status = 201, description = "Competition created", body = CompetitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Invite code already in use (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name, scoring_mode = %payload.scoring_mode))]
pub async fn create_competition(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCompetitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_competition(&payload)?;

    let invite_code = match payload.invite_code {
        Some(code) => code.trim().to_string(),
        None => generate_invite_code(),
    };

    let now = chrono::Utc::now();
    let model = competition::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        organizer: Set(payload.organizer.trim().to_string()),
        invite_code: Set(invite_code),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        status: Set(payload.status.unwrap_or(competition::CompetitionStatus::Created)),
        scoring_mode: Set(payload.scoring_mode),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(invite_code_conflict)?;

    info!(competition_id = model.id, "Competition created");
    Ok((StatusCode::CREATED, Json(CompetitionResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Competitions",
    operation_id = "listCompetitions",
    summary = "List competitions",
    description = "Paginated list, newest start date first. Optional name search and status filter.",
    params(CompetitionListQuery),
    responses(
        (status = 200, description = "List of competitions", body = CompetitionListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_competitions(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CompetitionListQuery>,
) -> Result<Json<CompetitionListResponse>, AppError> {
    let (page, per_page) = page_bounds(query.page, query.per_page);

    let mut select = competition::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(competition::Column::Name)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }
    if let Some(status) = query.status {
        select = select.filter(competition::Column::Status.eq(status));
    }

    let paginator = select
        .order_by_desc(competition::Column::StartDate)
        .order_by_desc(competition::Column::Id)
        .paginate(&state.db, per_page);
    let total = paginator.num_items().await?;
    let data = paginator.fetch_page(page - 1).await?;

    Ok(Json(CompetitionListResponse {
        data: data.into_iter().map(Into::into).collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Competitions",
    operation_id = "getCompetition",
    summary = "Get a competition by ID",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Competition details", body = CompetitionResponse),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_competition(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<CompetitionResponse>, AppError> {
    Ok(Json(find_competition(&state.db, id).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Competitions",
    operation_id = "updateCompetition",
    summary = "Update a competition",
    description = "Partially updates a competition. `scoring_mode` may be sent but must equal the current mode. Dates are validated against the stored values when only one of them changes.",
    params(("id" = i32, Path, description = "Competition ID")),
    request_body = UpdateCompetitionRequest,
    responses(
        (status = 200, description = "Competition updated", body = CompetitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Invite code already in use (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id))]
pub async fn update_competition(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateCompetitionRequest>,
) -> Result<Json<CompetitionResponse>, AppError> {
    validate_update_competition(&payload)?;

    if payload == UpdateCompetitionRequest::default() {
        return Ok(Json(find_competition(&state.db, id).await?.into()));
    }

    let txn = state.db.begin().await?;
    let existing = find_competition(&txn, id).await?;

    if let Some(mode) = payload.scoring_mode
        && mode != existing.scoring_mode
    {
        return Err(AppError::Validation(
            "scoring_mode cannot be changed after creation".into(),
        ));
    }

    let effective_start = payload.start_date.unwrap_or(existing.start_date);
    let effective_end = payload.end_date.unwrap_or(existing.end_date);
    if effective_end <= effective_start {
        return Err(AppError::Validation(
            "end_date must be after start_date".into(),
        ));
    }

    let mut active: competition::ActiveModel = existing.into();
    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(ref organizer) = payload.organizer {
        active.organizer = Set(organizer.trim().to_string());
    }
    if let Some(ref code) = payload.invite_code {
        active.invite_code = Set(code.trim().to_string());
    }
    if let Some(start_date) = payload.start_date {
        active.start_date = Set(start_date);
    }
    if let Some(end_date) = payload.end_date {
        active.end_date = Set(end_date);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(invite_code_conflict)?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Competitions",
    operation_id = "deleteCompetition",
    summary = "Delete a competition",
    description = "Deletes the competition together with its solves, teams, memberships, registrations, exercise links and attendance records in one transaction. Exercises themselves are kept.",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 204, description = "Competition deleted"),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_competition(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_competition(&txn, id).await?;

    // Teams go away with the competition, so their cached scores need no correction.
    let solves = solve::Entity::delete_many()
        .filter(solve::Column::CompetitionId.eq(id))
        .exec(&txn)
        .await?;
    attendance::Entity::delete_many()
        .filter(attendance::Column::CompetitionId.eq(id))
        .exec(&txn)
        .await?;
    team_member::Entity::delete_many()
        .filter(team_member::Column::CompetitionId.eq(id))
        .exec(&txn)
        .await?;
    team::Entity::delete_many()
        .filter(team::Column::CompetitionId.eq(id))
        .exec(&txn)
        .await?;
    competition_user::Entity::delete_many()
        .filter(competition_user::Column::CompetitionId.eq(id))
        .exec(&txn)
        .await?;
    competition_exercise::Entity::delete_many()
        .filter(competition_exercise::Column::CompetitionId.eq(id))
        .exec(&txn)
        .await?;
    competition::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    info!(removed_solves = solves.rows_affected, "Competition deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/register",
    tag = "Competitions",
    operation_id = "registerUser",
    summary = "Register a user individually",
    description = "Records an individual registration. In `user` scoring mode this is what makes the user eligible to submit flags.",
    params(("id" = i32, Path, description = "Competition ID")),
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = RegistrationResponse),
        (status = 404, description = "Competition or user not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already registered (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(competition_id, user_id = payload.user_id))]
pub async fn register_user(
    State(state): State<AppState>,
    AppPath(competition_id): AppPath<i32>,
    AppJson(payload): AppJson<RegisterUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_competition(&txn, competition_id).await?;
    let target = find_user(&txn, payload.user_id).await?;

    let registration = competition_user::ActiveModel {
        competition_id: Set(competition_id),
        user_id: Set(target.id),
        registered_at: Set(chrono::Utc::now()),
    };

    match registration.insert(&txn).await {
        Ok(model) => {
            txn.commit().await?;
            Ok((
                StatusCode::CREATED,
                Json(RegistrationResponse {
                    competition_id: model.competition_id,
                    user_id: model.user_id,
                    username: target.username,
                    registered_at: model.registered_at,
                }),
            ))
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(AppError::Conflict("Already registered".into()))
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/{id}/exercises",
    tag = "Competitions",
    operation_id = "listCompetitionExercises",
    summary = "List exercises of a competition",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Linked exercises, flags omitted", body = Vec<ExerciseResponse>),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(competition_id))]
pub async fn list_competition_exercises(
    State(state): State<AppState>,
    AppPath(competition_id): AppPath<i32>,
) -> Result<Json<Vec<ExerciseResponse>>, AppError> {
    find_competition(&state.db, competition_id).await?;

    let exercises: Vec<exercise::Model> = competition_exercise::Entity::find()
        .filter(competition_exercise::Column::CompetitionId.eq(competition_id))
        .find_also_related(exercise::Entity)
        .order_by_asc(competition_exercise::Column::ExerciseId)
        .all(&state.db)
        .await?
        .into_iter()
        .filter_map(|(_, ex)| ex)
        .collect();

    let ids: Vec<i32> = exercises.iter().map(|e| e.id).collect();
    let mut tags = tags_for_exercises(&state.db, &ids).await?;

    Ok(Json(
        exercises
            .into_iter()
            .map(|e| {
                let names = tags.remove(&e.id).unwrap_or_default();
                ExerciseResponse::new(e, names)
            })
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/{id}/exercises/{exercise_id}",
    tag = "Competitions",
    operation_id = "linkExercise",
    summary = "Link an exercise to a competition",
    params(
        ("id" = i32, Path, description = "Competition ID"),
        ("exercise_id" = i32, Path, description = "Exercise ID"),
    ),
    responses(
        (status = 201, description = "Exercise linked", body = CompetitionExerciseResponse),
        (status = 404, description = "Competition or exercise not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already linked (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(competition_id, exercise_id))]
pub async fn link_exercise(
    State(state): State<AppState>,
    AppPath((competition_id, exercise_id)): AppPath<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_competition(&txn, competition_id).await?;
    find_exercise(&txn, exercise_id).await?;

    let link = competition_exercise::ActiveModel {
        competition_id: Set(competition_id),
        exercise_id: Set(exercise_id),
        linked_at: Set(chrono::Utc::now()),
    };

    match link.insert(&txn).await {
        Ok(model) => {
            txn.commit().await?;
            Ok((
                StatusCode::CREATED,
                Json(CompetitionExerciseResponse {
                    competition_id: model.competition_id,
                    exercise_id: model.exercise_id,
                    linked_at: model.linked_at,
                }),
            ))
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
            AppError::Conflict("Exercise is already part of this competition".into()),
        ),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    delete,
    path = "/{id}/exercises/{exercise_id}",
    tag = "Competitions",
    operation_id = "unlinkExercise",
    summary = "Unlink an exercise from a competition",
    description = "Refused once the exercise has been solved in the competition, since the solves would no longer belong to a linked exercise.",
    params(
        ("id" = i32, Path, description = "Competition ID"),
        ("exercise_id" = i32, Path, description = "Exercise ID"),
    ),
    responses(
        (status = 204, description = "Exercise unlinked"),
        (status = 404, description = "Link not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Exercise has solves in this competition (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(competition_id, exercise_id))]
pub async fn unlink_exercise(
    State(state): State<AppState>,
    AppPath((competition_id, exercise_id)): AppPath<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    let link = competition_exercise::Entity::find_by_id((competition_id, exercise_id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Exercise is not part of this competition".into()))?;

    let solved = solve::Entity::find()
        .filter(solve::Column::CompetitionId.eq(competition_id))
        .filter(solve::Column::ExerciseId.eq(exercise_id))
        .count(&txn)
        .await?;
    if solved > 0 {
        return Err(AppError::Conflict(
            "Exercise already has solves in this competition".into(),
        ));
    }

    link.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
