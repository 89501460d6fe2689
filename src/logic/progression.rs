//! Score submission: persist a result, then re-run seeding and knockout advancement.

use crate::db::Database;
use crate::logic::{finals, group_play, seeding, store};
use crate::models::{
    Entity, GameMatch, MatchId, MatchStatus, Player, Round, TournamentError, TournamentId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

/// Engine switches that are not stored per tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ProgressionOptions {
    /// Also play off the two semi-final losers.
    pub third_place_match: bool,
}

/// One async mutex per tournament, so two score submissions for the same
/// tournament never interleave their read-modify-write of bracket rows.
///
/// Entries nobody holds or waits on are pruned whenever a lock is taken, so
/// deleted tournaments do not accumulate.
#[derive(Debug, Default)]
pub struct TournamentLocks {
    locks: Mutex<HashMap<TournamentId, Arc<tokio::sync::Mutex<()>>>>,
}

impl TournamentLocks {
    pub async fn lock(&self, tournament_id: TournamentId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // guards and waiters hold their own clone of the Arc
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            Arc::clone(locks.entry(tournament_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Tournaments with a lock currently held or awaited.
    pub fn active(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|l| Arc::strong_count(l) > 1)
            .count()
    }
}

/// Raw score fields as submitted by a client, before validation.
#[derive(Clone, Debug, Deserialize)]
pub struct ScoreSubmission {
    #[serde(default)]
    pub score1: serde_json::Value,
    #[serde(default)]
    pub score2: serde_json::Value,
}

impl ScoreSubmission {
    /// Both scores as non-negative integers, or a validation error naming the bad field.
    pub fn validate(&self) -> Result<(u32, u32), TournamentError> {
        Ok((
            parse_score("score1", &self.score1)?,
            parse_score("score2", &self.score2)?,
        ))
    }
}

fn parse_score(field: &str, value: &serde_json::Value) -> Result<u32, TournamentError> {
    match value.as_i64() {
        Some(n) if n < 0 => Err(TournamentError::Validation(format!(
            "{field} must be non-negative"
        ))),
        Some(n) => u32::try_from(n)
            .map_err(|_| TournamentError::Validation(format!("{field} is too large"))),
        None => Err(TournamentError::Validation(format!(
            "{field} must be a whole number"
        ))),
    }
}

/// Result of a score update: the stored match, plus the champion once the final is decided.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ScoreUpdate {
    #[serde(flatten)]
    pub game_match: GameMatch,
    pub winner: Option<Player>,
}

/// Entry point for everything that changes a tournament's matches.
#[derive(Debug, Default)]
pub struct Progression {
    options: ProgressionOptions,
    locks: TournamentLocks,
}

impl Progression {
    pub fn new(options: ProgressionOptions) -> Self {
        Self {
            options,
            locks: TournamentLocks::default(),
        }
    }

    pub fn options(&self) -> ProgressionOptions {
        self.options
    }

    /// Record a result and move the tournament forward.
    ///
    /// 1. Write the scores and mark the match completed.
    /// 2. Read the row back; anything but `completed` is an inconsistent state.
    /// 3. A group match may complete the group stage: try seeding the knockouts.
    /// 4. Always try to advance the knockout rounds.
    /// 5. A completed final carries the tournament winner (best effort).
    ///
    /// Knockout matches need a winner, so a drawn knockout score is rejected.
    pub async fn update_match_score(
        &self,
        db: &dyn Database,
        match_id: MatchId,
        score1: u32,
        score2: u32,
    ) -> Result<ScoreUpdate, TournamentError> {
        let existing = store::fetch_match(db, match_id)
            .await?
            .ok_or_else(|| TournamentError::not_found(Entity::Match, match_id))?;
        if !existing.round.is_group() && score1 == score2 {
            return Err(TournamentError::Validation(format!(
                "A {} match cannot end in a draw",
                existing.round
            )));
        }

        let tournament_id = existing.tournament_id;
        let _guard = self.locks.lock(tournament_id).await;

        db.execute(
            "UPDATE matches SET score1 = ?, score2 = ?, status = ? WHERE id = ?",
            &[
                score1.into(),
                score2.into(),
                MatchStatus::Completed.as_str().into(),
                match_id.into(),
            ],
        )
        .await?;

        let updated = store::fetch_match(db, match_id).await?.ok_or_else(|| {
            log::error!("match {match_id} not found after score update");
            TournamentError::InconsistentState(format!("match {match_id} not found after update"))
        })?;
        if !updated.is_completed() {
            log::error!(
                "match {match_id} reads back as {:?} after score update",
                updated.status
            );
            return Err(TournamentError::InconsistentState(format!(
                "match {match_id} not marked completed"
            )));
        }
        log::debug!(
            "Tournament {tournament_id}: {} match {match_id} scored {score1}-{score2}",
            updated.round
        );

        if updated.round.is_group() {
            seeding::try_generate_knockout_matches(db, tournament_id).await?;
        }
        finals::try_advance_knockout(db, tournament_id, self.options).await?;

        let winner = if updated.round == Round::Final {
            match finals::get_winner(db, tournament_id).await {
                Ok(winner) => winner,
                Err(e) => {
                    log::warn!("Tournament {tournament_id}: winner lookup failed: {e}");
                    None
                }
            }
        } else {
            None
        };

        Ok(ScoreUpdate {
            game_match: updated,
            winner,
        })
    }

    /// Validate a raw submission, then [`Progression::update_match_score`].
    /// An invalid submission is rejected before anything is read or written.
    pub async fn submit_score(
        &self,
        db: &dyn Database,
        match_id: MatchId,
        submission: &ScoreSubmission,
    ) -> Result<ScoreUpdate, TournamentError> {
        let (score1, score2) = submission.validate()?;
        self.update_match_score(db, match_id, score1, score2).await
    }

    /// [`group_play::generate_matches`] under the tournament's lock.
    pub async fn generate_matches(
        &self,
        db: &dyn Database,
        tournament_id: TournamentId,
        group_count: Option<usize>,
    ) -> Result<Vec<GameMatch>, TournamentError> {
        let _guard = self.locks.lock(tournament_id).await;
        group_play::generate_matches(db, tournament_id, group_count).await
    }
}
