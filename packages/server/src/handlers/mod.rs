pub mod attendance;
pub mod competition;
pub mod container;
pub mod exercise;
pub mod health;
pub mod scoreboard;
pub mod solve;
pub mod tag;
pub mod team;
pub mod user;
