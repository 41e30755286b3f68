//! Flag submission and scoring.
//!
//! Everything that can award points lives here. Handlers call
//! [`submit_flag`] and [`build_scoreboard`]; the rest of the module is the
//! data access those two need.

pub mod aggregate;
pub mod identity;
pub mod ledger;
pub mod scoreboard;
pub mod validator;

use sea_orm::DbErr;

pub use identity::ScoringEntity;
pub use scoreboard::{Scoreboard, ScoreboardEntry, build_scoreboard};
pub use validator::{FlagSubmission, SubmissionOutcome, submit_flag};

use crate::utils::retry::Transient;

/// Reasons a submission or scoreboard request is refused.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("exercise does not exist or is inactive")]
    ExerciseUnavailable,
    #[error("exercise is not linked to the competition")]
    ContextMismatch,
    #[error("actor is not eligible in the competition")]
    NotEligible,
    #[error("competition not found")]
    CompetitionNotFound,
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl Transient for ScoringError {
    fn is_transient(&self) -> bool {
        match self {
            ScoringError::Db(e) => e.is_transient(),
            _ => false,
        }
    }
}
