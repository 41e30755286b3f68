use std::cmp::Ordering;

use sea_orm::ConnectionTrait;
use serde::Serialize;

use super::ScoringError;
use super::{aggregate, identity};
use crate::entity::competition::ScoringMode;

/// One row of a competition scoreboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ScoreboardEntry {
    /// Competition ranking: tied scores share a rank and the next rank skips.
    #[schema(example = 1)]
    pub rank: u32,
    pub entity_kind: ScoringMode,
    #[schema(example = 3)]
    pub entity_id: i32,
    #[schema(example = "null_pointers")]
    pub entity_name: String,
    #[schema(example = 450)]
    pub score: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Scoreboard {
    pub competition_id: i32,
    pub scoring_mode: ScoringMode,
    pub entries: Vec<ScoreboardEntry>,
}

/// An entity and its score before ranking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Standing {
    pub entity_id: i32,
    pub name: String,
    pub score: i64,
}

/// Score descending, then name ascending, then id ascending.
fn standing_order(a: &Standing, b: &Standing) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.entity_id.cmp(&b.entity_id))
}

/// Sort standings and assign competition ranks ("1224").
pub fn rank_standings(mut standings: Vec<Standing>, kind: ScoringMode) -> Vec<ScoreboardEntry> {
    standings.sort_by(standing_order);

    let mut entries = Vec::with_capacity(standings.len());
    let mut previous: Option<(i64, u32)> = None;
    for (index, standing) in standings.into_iter().enumerate() {
        let position = index as u32 + 1;
        let rank = match previous {
            Some((score, rank)) if score == standing.score => rank,
            _ => position,
        };
        previous = Some((standing.score, rank));
        entries.push(ScoreboardEntry {
            rank,
            entity_kind: kind,
            entity_id: standing.entity_id,
            entity_name: standing.name,
            score: standing.score,
        });
    }
    entries
}

/// Build the ranked scoreboard of a competition.
///
/// Entities without solves are listed with score 0.
pub async fn build_scoreboard<C: ConnectionTrait>(
    db: &C,
    competition_id: i32,
) -> Result<Scoreboard, ScoringError> {
    let competition = identity::get_competition(db, competition_id)
        .await?
        .ok_or(ScoringError::CompetitionNotFound)?;

    let entities = identity::list_scoring_entities(db, &competition).await?;
    let scores = aggregate::scores_for_competition(db, &competition).await?;

    let standings = entities
        .into_iter()
        .map(|e| Standing {
            score: scores.get(&e.entity_id).copied().unwrap_or(0),
            entity_id: e.entity_id,
            name: e.name,
        })
        .collect();

    Ok(Scoreboard {
        competition_id,
        scoring_mode: competition.scoring_mode,
        entries: rank_standings(standings, competition.scoring_mode),
    })
}
