use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument};

use super::ScoringError;
use super::aggregate;
use super::identity::{self, ScoringEntity};
use super::ledger::{self, InsertOutcome, NewSolve};
use crate::entity::solve;

/// Longest flag, in bytes. Longer submissions can never match.
pub const MAX_FLAG_LEN: usize = 1024;

/// A flag submitted by `actor_id` for an exercise of a competition.
#[derive(Clone, Debug)]
pub struct FlagSubmission {
    pub actor_id: i32,
    pub exercise_id: i32,
    pub competition_id: i32,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// First correct submission for the key; `solve` holds the awarded points.
    Accepted {
        solve: solve::Model,
        entity: ScoringEntity,
    },
    IncorrectFlag,
    /// Correct flag, but the entity already holds this solve.
    AlreadySolved { entity: ScoringEntity },
}

impl SubmissionOutcome {
    pub fn points_awarded(&self) -> i32 {
        match self {
            Self::Accepted { solve, .. } => solve.points_awarded,
            Self::IncorrectFlag | Self::AlreadySolved { .. } => 0,
        }
    }

    /// The credited entity, if the flag was correct.
    pub fn entity(&self) -> Option<ScoringEntity> {
        match self {
            Self::Accepted { entity, .. } | Self::AlreadySolved { entity } => Some(*entity),
            Self::IncorrectFlag => None,
        }
    }
}

/// Exact, case-sensitive comparison after trimming surrounding whitespace
/// from the submission. The secret is compared as stored.
pub fn flag_matches(submitted: &str, secret: &str) -> bool {
    submitted.len() <= MAX_FLAG_LEN && submitted.trim() == secret
}

/// Validate a flag submission and, on first success, record the solve.
///
/// Checks run in a fixed order and stop at the first failure:
/// exercise active, exercise linked to competition, actor eligible, flag
/// correct, key not yet solved. All reads and the write share one
/// transaction; only `Accepted` commits anything.
#[instrument(
    skip(db, submission),
    fields(
        actor_id = submission.actor_id,
        exercise_id = submission.exercise_id,
        competition_id = submission.competition_id
    )
)]
pub async fn submit_flag(
    db: &DatabaseConnection,
    submission: FlagSubmission,
) -> Result<SubmissionOutcome, ScoringError> {
    let FlagSubmission {
        actor_id,
        exercise_id,
        competition_id,
        content,
    } = submission;

    let txn = db.begin().await?;

    let exercise = identity::get_exercise(&txn, exercise_id)
        .await?
        .filter(|e| e.is_active)
        .ok_or(ScoringError::ExerciseUnavailable)?;

    if !identity::is_exercise_linked_to_competition(&txn, exercise_id, competition_id).await? {
        return Err(ScoringError::ContextMismatch);
    }

    let competition = identity::get_competition(&txn, competition_id)
        .await?
        .ok_or(ScoringError::CompetitionNotFound)?;

    let entity = identity::scoring_entity_for_actor(&txn, actor_id, &competition)
        .await?
        .ok_or(ScoringError::NotEligible)?;

    if !flag_matches(&content, &exercise.flag) {
        debug!(entity_id = entity.id(), "Incorrect flag");
        return Ok(SubmissionOutcome::IncorrectFlag);
    }

    // Early exit only; the unique index decides below.
    if ledger::find_solve(&txn, entity, exercise_id, competition_id)
        .await?
        .is_some()
    {
        info!(entity_id = entity.id(), "Exercise already solved");
        return Ok(SubmissionOutcome::AlreadySolved { entity });
    }

    let outcome = ledger::insert_solve_if_absent(
        &txn,
        NewSolve {
            actor_id,
            entity,
            exercise_id,
            competition_id,
            points: exercise.points,
            content: content.trim().to_string(),
        },
    )
    .await?;

    match outcome {
        InsertOutcome::AlreadyExists => {
            info!(entity_id = entity.id(), "Lost solve race, already solved");
            Ok(SubmissionOutcome::AlreadySolved { entity })
        }
        InsertOutcome::Inserted(solve) => {
            aggregate::increment_aggregate_score(&txn, entity, i64::from(solve.points_awarded))
                .await?;
            txn.commit().await?;
            info!(
                entity_kind = %entity.kind(),
                entity_id = entity.id(),
                points = solve.points_awarded,
                "Flag accepted"
            );
            Ok(SubmissionOutcome::Accepted { solve, entity })
        }
    }
}
