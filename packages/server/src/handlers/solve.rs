use axum::Json;
use axum::extract::State;
use sea_orm::{DbErr, EntityTrait};
use tracing::instrument;

use super::competition::find_competition;
use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::params::AppPath;
use crate::models::solve::*;
use crate::scoring::{self, FlagSubmission, aggregate, ledger};
use crate::state::AppState;
use crate::utils::retry::retry_read;

#[utoipa::path(
    post,
    path = "/submit",
    tag = "Solves",
    operation_id = "submitFlag",
    summary = "Submit a flag",
    description = "Validates a flag for an exercise in a competition and records the first correct submission per scoring entity. `incorrect_flag` and `already_solved` are normal outcomes returned with 200 and zero points.",
    request_body = SubmitFlagRequest,
    responses(
        (status = 200, description = "Submission evaluated", body = SubmitFlagResponse),
        (status = 400, description = "Malformed request body (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Not registered in the competition (NOT_ELIGIBLE)", body = ErrorBody),
        (status = 404, description = "Exercise missing or inactive (EXERCISE_UNAVAILABLE), or competition vanished (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Exercise not part of the competition (CONTEXT_MISMATCH)", body = ErrorBody),
    ),
)]
#[instrument(
    skip(state, payload),
    fields(
        user_id = payload.user_id,
        exercise_id = payload.exercise_id,
        competition_id = payload.competition_id
    )
)]
pub async fn submit(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SubmitFlagRequest>,
) -> Result<Json<SubmitFlagResponse>, AppError> {
    let outcome = scoring::submit_flag(
        &state.db,
        FlagSubmission {
            actor_id: payload.user_id,
            exercise_id: payload.exercise_id,
            competition_id: payload.competition_id,
            content: payload.content,
        },
    )
    .await?;

    let entity = outcome.entity();
    let mut response = SubmitFlagResponse::from(outcome);
    if let Some(entity) = entity {
        let db = &state.db;
        let competition_id = payload.competition_id;
        response.entity_score = Some(
            retry_read(&state.config.scoring, move || {
                aggregate::aggregate_score(db, competition_id, entity)
            })
            .await?,
        );
    }

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "Solves",
    operation_id = "listUserSolves",
    summary = "List a user's solves",
    description = "Returns every solve the user submitted, across competitions, newest first.",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Solves of the user", body = Vec<SolveResponse>),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(user_id))]
pub async fn list_user_solves(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i32>,
) -> Result<Json<Vec<SolveResponse>>, AppError> {
    let db = &state.db;
    let found = retry_read(&state.config.scoring, move || async move {
        match user::Entity::find_by_id(user_id).one(db).await? {
            Some(_) => ledger::solves_by_actor(db, user_id).await.map(Some),
            None => Ok::<_, DbErr>(None),
        }
    })
    .await?;

    let solves = found.ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(solves.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}/solves",
    tag = "Solves",
    operation_id = "listCompetitionSolves",
    summary = "List a competition's solves",
    description = "Returns all solves recorded in the competition, oldest first.",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Solves in the competition", body = Vec<SolveResponse>),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(competition_id))]
pub async fn list_competition_solves(
    State(state): State<AppState>,
    AppPath(competition_id): AppPath<i32>,
) -> Result<Json<Vec<SolveResponse>>, AppError> {
    find_competition(&state.db, competition_id).await?;

    let db = &state.db;
    let solves = retry_read(&state.config.scoring, move || {
        ledger::solves_in_competition(db, competition_id)
    })
    .await?;

    Ok(Json(solves.into_iter().map(Into::into).collect()))
}
