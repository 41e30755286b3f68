use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::competition::ScoringMode;
use crate::entity::solve;
use crate::scoring::SubmissionOutcome;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitFlagRequest {
    /// The submitting user.
    #[schema(example = 7)]
    pub user_id: i32,
    #[schema(example = 3)]
    pub exercise_id: i32,
    #[schema(example = 1)]
    pub competition_id: i32,
    /// Submitted flag. Surrounding whitespace is ignored; blank or overlong
    /// content is an ordinary `incorrect_flag`.
    #[schema(example = "CTF{buffer_overflow}")]
    pub content: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionOutcomeKind {
    Accepted,
    IncorrectFlag,
    AlreadySolved,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmitFlagResponse {
    pub outcome: SubmissionOutcomeKind,
    /// Points credited by this submission; 0 unless `accepted`.
    #[schema(example = 100)]
    pub points_awarded: i32,
    #[schema(example = "Correct flag")]
    pub message: String,
    /// Present for `accepted` and `already_solved`.
    pub entity_kind: Option<ScoringMode>,
    pub entity_id: Option<i32>,
    /// Id of the solve written by this submission.
    pub solve_id: Option<i32>,
    /// The credited entity's total score after this submission.
    #[schema(example = 450)]
    pub entity_score: Option<i64>,
}

impl From<SubmissionOutcome> for SubmitFlagResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        let points_awarded = outcome.points_awarded();
        match outcome {
            SubmissionOutcome::Accepted { solve, entity } => Self {
                outcome: SubmissionOutcomeKind::Accepted,
                points_awarded,
                message: "Correct flag".into(),
                entity_kind: Some(entity.kind()),
                entity_id: Some(entity.id()),
                solve_id: Some(solve.id),
                entity_score: None,
            },
            SubmissionOutcome::IncorrectFlag => Self {
                outcome: SubmissionOutcomeKind::IncorrectFlag,
                points_awarded,
                message: "Incorrect flag".into(),
                entity_kind: None,
                entity_id: None,
                solve_id: None,
                entity_score: None,
            },
            SubmissionOutcome::AlreadySolved { entity } => Self {
                outcome: SubmissionOutcomeKind::AlreadySolved,
                points_awarded,
                message: "Exercise already solved".into(),
                entity_kind: Some(entity.kind()),
                entity_id: Some(entity.id()),
                solve_id: None,
                entity_score: None,
            },
        }
    }
}

/// A recorded solve. The submitted content is not echoed back.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SolveResponse {
    pub id: i32,
    pub competition_id: i32,
    pub exercise_id: i32,
    /// The user who submitted the flag.
    pub user_id: i32,
    pub entity_kind: ScoringMode,
    pub entity_id: i32,
    pub points_awarded: i32,
    pub created_at: DateTime<Utc>,
}

impl From<solve::Model> for SolveResponse {
    fn from(m: solve::Model) -> Self {
        Self {
            id: m.id,
            competition_id: m.competition_id,
            exercise_id: m.exercise_id,
            user_id: m.user_id,
            entity_kind: m.entity_kind,
            entity_id: m.entity_id,
            points_awarded: m.points_awarded,
            created_at: m.created_at,
        }
    }
}
