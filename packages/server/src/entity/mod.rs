pub mod attendance;
pub mod competition;
pub mod competition_exercise;
pub mod competition_user;
pub mod container;
pub mod exercise;
pub mod exercise_tag;
pub mod solve;
pub mod tag;
pub mod team;
pub mod team_member;
pub mod user;
