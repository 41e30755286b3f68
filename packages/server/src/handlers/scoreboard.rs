use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::params::AppPath;
use crate::scoring::{Scoreboard, build_scoreboard};
use crate::state::AppState;
use crate::utils::retry::retry_read;

#[utoipa::path(
    get,
    path = "/{id}/scoreboard",
    tag = "Scoreboard",
    operation_id = "getScoreboard",
    summary = "Ranked scoreboard of a competition",
    description = "Lists every team (team mode) or registered user (user mode) of the competition with its score. Entities without solves appear with 0. Ordered by score descending, then name, then id; equal scores share a rank and the next rank is skipped.",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Scoreboard", body = Scoreboard),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(competition_id))]
pub async fn get_scoreboard(
    State(state): State<AppState>,
    AppPath(competition_id): AppPath<i32>,
) -> Result<Json<Scoreboard>, AppError> {
    let db = &state.db;
    let board = retry_read(&state.config.scoring, move || {
        build_scoreboard(db, competition_id)
    })
    .await?;

    Ok(Json(board))
}
