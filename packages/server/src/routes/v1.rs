use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{
    attendance, competition, container, exercise, health, scoreboard, solve, tag, team, user,
};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health::health))
        .nest("/solves", solve_routes())
        .nest("/competitions", competition_routes())
        .nest("/teams", team_routes())
        .nest("/exercises", exercise_routes())
        .nest("/users", user_routes())
        .nest("/tags", tag_routes())
        .nest("/containers", container_routes())
        .nest("/attendance", attendance_routes())
}

fn solve_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(solve::submit))
        .routes(routes!(solve::list_user_solves))
}

fn competition_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            competition::list_competitions,
            competition::create_competition
        ))
        .routes(routes!(
            competition::get_competition,
            competition::update_competition,
            competition::delete_competition
        ))
        .routes(routes!(competition::register_user))
        .routes(routes!(team::list_teams, team::create_team))
        .routes(routes!(competition::list_competition_exercises))
        .routes(routes!(
            competition::link_exercise,
            competition::unlink_exercise
        ))
        .routes(routes!(solve::list_competition_solves))
        .routes(routes!(scoreboard::get_scoreboard))
}

fn team_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(team::get_team))
        .routes(routes!(team::join_team))
        .routes(routes!(team::leave_team))
}

fn exercise_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(exercise::list_exercises, exercise::create_exercise))
        .routes(routes!(
            exercise::get_exercise,
            exercise::update_exercise,
            exercise::delete_exercise
        ))
        .routes(routes!(exercise::add_tag, exercise::remove_tag))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(user::list_users, user::create_user))
        .routes(routes!(user::get_user))
}

fn tag_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(tag::list_tags, tag::create_tag))
        .routes(routes!(tag::delete_tag))
}

fn container_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            container::list_containers,
            container::create_container
        ))
        .routes(routes!(
            container::get_container,
            container::delete_container
        ))
        .routes(routes!(container::get_active_container))
}

fn attendance_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(attendance::record_attendance))
        .routes(routes!(attendance::list_user_attendance))
}
