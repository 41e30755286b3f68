use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument};

use super::competition::find_competition;
use super::user::find_user;
use crate::entity::competition::ScoringMode;
use crate::entity::{team, team_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::params::AppPath;
use crate::models::team::*;
use crate::state::AppState;

async fn find_team<C: ConnectionTrait>(db: &C, id: i32) -> Result<team::Model, AppError> {
    team::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))
}

async fn member_ids<C: ConnectionTrait>(db: &C, team_id: i32) -> Result<Vec<i32>, DbErr> {
    team_member::Entity::find()
        .select_only()
        .column(team_member::Column::UserId)
        .filter(team_member::Column::TeamId.eq(team_id))
        .order_by_asc(team_member::Column::JoinedAt)
        .order_by_asc(team_member::Column::UserId)
        .into_tuple()
        .all(db)
        .await
}

/// Insert a membership, reporting a second team in the same competition as a conflict.
async fn add_member<C: ConnectionTrait>(
    db: &C,
    team: &team::Model,
    user_id: i32,
) -> Result<(), AppError> {
    let membership = team_member::ActiveModel {
        competition_id: Set(team.competition_id),
        user_id: Set(user_id),
        team_id: Set(team.id),
        joined_at: Set(chrono::Utc::now()),
    };
    match membership.insert(db).await {
        Ok(_) => Ok(()),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
            AppError::Conflict("User already belongs to a team in this competition".into()),
        ),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    post,
    path = "/{id}/teams",
    tag = "Teams",
    operation_id = "createTeam",
    summary = "Create a team in a competition",
    description = "Creates a team with a score of 0 and makes the creator its first member. Only allowed in `team` scoring mode.",
    params(("id" = i32, Path, description = "Competition ID")),
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, description = "Validation error or individual-scoring competition (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Competition or creator not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Creator already in a team of this competition (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(competition_id, creator_id = payload.creator_id))]
pub async fn create_team(
    State(state): State<AppState>,
    AppPath(competition_id): AppPath<i32>,
    AppJson(payload): AppJson<CreateTeamRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_team(&payload)?;

    let txn = state.db.begin().await?;
    let competition = find_competition(&txn, competition_id).await?;
    if competition.scoring_mode != ScoringMode::Team {
        return Err(AppError::Validation(
            "Competition uses individual scoring and has no teams".into(),
        ));
    }
    let creator = find_user(&txn, payload.creator_id).await?;

    let model = team::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        competition_id: Set(competition_id),
        creator_id: Set(creator.id),
        score: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    add_member(&txn, &model, creator.id).await?;
    txn.commit().await?;

    info!(team_id = model.id, "Team created");
    Ok((
        StatusCode::CREATED,
        Json(TeamResponse::new(model, vec![creator.id])),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/teams",
    tag = "Teams",
    operation_id = "listTeams",
    summary = "List teams of a competition",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Teams ordered by id", body = Vec<TeamResponse>),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(competition_id))]
pub async fn list_teams(
    State(state): State<AppState>,
    AppPath(competition_id): AppPath<i32>,
) -> Result<Json<Vec<TeamResponse>>, AppError> {
    find_competition(&state.db, competition_id).await?;

    let teams = team::Entity::find()
        .filter(team::Column::CompetitionId.eq(competition_id))
        .order_by_asc(team::Column::Id)
        .all(&state.db)
        .await?;

    let memberships = team_member::Entity::find()
        .filter(team_member::Column::CompetitionId.eq(competition_id))
        .order_by_asc(team_member::Column::JoinedAt)
        .order_by_asc(team_member::Column::UserId)
        .all(&state.db)
        .await?;
    let mut members: HashMap<i32, Vec<i32>> = HashMap::new();
    for m in memberships {
        members.entry(m.team_id).or_default().push(m.user_id);
    }

    Ok(Json(
        teams
            .into_iter()
            .map(|t| {
                let ids = members.remove(&t.id).unwrap_or_default();
                TeamResponse::new(t, ids)
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Teams",
    operation_id = "getTeam",
    summary = "Get a team with its members and score",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team details", body = TeamResponse),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_team(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<TeamResponse>, AppError> {
    let model = find_team(&state.db, id).await?;
    let ids = member_ids(&state.db, id).await?;
    Ok(Json(TeamResponse::new(model, ids)))
}

#[utoipa::path(
    post,
    path = "/{id}/join",
    tag = "Teams",
    operation_id = "joinTeam",
    summary = "Join a team",
    description = "Adds the user to the team. A user can be in at most one team per competition.",
    params(("id" = i32, Path, description = "Team ID")),
    request_body = JoinTeamRequest,
    responses(
        (status = 200, description = "Joined; returns the team", body = TeamResponse),
        (status = 404, description = "Team or user not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already in a team of this competition (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id, user_id = payload.user_id))]
pub async fn join_team(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<JoinTeamRequest>,
) -> Result<Json<TeamResponse>, AppError> {
    let txn = state.db.begin().await?;
    let model = find_team(&txn, id).await?;
    find_user(&txn, payload.user_id).await?;

    add_member(&txn, &model, payload.user_id).await?;
    let ids = member_ids(&txn, id).await?;
    txn.commit().await?;

    Ok(Json(TeamResponse::new(model, ids)))
}

#[utoipa::path(
    delete,
    path = "/{id}/members/{user_id}",
    tag = "Teams",
    operation_id = "leaveTeam",
    summary = "Remove a member from a team",
    description = "Solves already credited to the team stay with the team.",
    params(
        ("id" = i32, Path, description = "Team ID"),
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 404, description = "Team not found or user not a member (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id, user_id))]
pub async fn leave_team(
    State(state): State<AppState>,
    AppPath((id, user_id)): AppPath<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let model = find_team(&txn, id).await?;

    let membership = team_member::Entity::find_by_id((model.competition_id, user_id))
        .one(&txn)
        .await?
        .filter(|m| m.team_id == id)
        .ok_or_else(|| AppError::NotFound("User is not a member of this team".into()))?;

    membership.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
