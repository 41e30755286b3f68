
mod competition;
mod exercise;
mod scoreboard;
mod team;
