//! Knockout rounds: quarter-finals to semi-finals to final. The tournament completes with the final.

use crate::db::Database;
use crate::logic::progression::ProgressionOptions;
use crate::logic::store;
use crate::models::{
    GameMatch, MatchStatus, Player, PlayerId, Round, TournamentError, TournamentId,
    TournamentStatus,
};

/// Winners of a fully played round, in match id order. `None` unless exactly
/// `expected` matches exist and all of them are completed.
fn round_winners(matches: &[GameMatch], expected: usize) -> Option<Vec<PlayerId>> {
    if matches.len() != expected || !matches.iter().all(GameMatch::is_completed) {
        return None;
    }
    matches.iter().map(GameMatch::winner).collect()
}

/// Advance the bracket as far as current knockout results allow.
///
/// Each stage is checked independently, in order, on every call:
/// 1. four completed quarter-finals seed the semis (W1 v W4, W2 v W3);
/// 2. two completed semis seed the final (and the third-place match when enabled);
/// 3. a single completed final completes the tournament.
///
/// Existing rows are reconciled rather than appended to, so calling this after
/// any match update, related or not, is always safe. A later round is never
/// deleted when an earlier one changes: it keeps its rows until the earlier
/// round is complete again, then is updated in place.
pub async fn try_advance_knockout(
    db: &dyn Database,
    tournament_id: TournamentId,
    options: ProgressionOptions,
) -> Result<(), TournamentError> {
    let quarters = store::fetch_round(db, tournament_id, &Round::Quarter).await?;
    if let Some(w) = round_winners(&quarters, 4) {
        let semis = store::fetch_round(db, tournament_id, &Round::Semi).await?;
        let desired = [(w[0], w[3]), (w[1], w[2])];
        if store::reconcile_round(db, tournament_id, &Round::Semi, &semis, &desired).await? {
            log::info!("Tournament {tournament_id}: semi-finals set {desired:?}");
        }
    }

    let semis = store::fetch_round(db, tournament_id, &Round::Semi).await?;
    if let Some(w) = round_winners(&semis, 2) {
        let finals = store::fetch_round(db, tournament_id, &Round::Final).await?;
        let desired = [(w[0], w[1])];
        if store::reconcile_round(db, tournament_id, &Round::Final, &finals, &desired).await? {
            log::info!("Tournament {tournament_id}: final set {:?}", desired[0]);
        }

        if options.third_place_match {
            let losers: Option<Vec<PlayerId>> = semis.iter().map(GameMatch::loser).collect();
            if let Some(l) = losers {
                let existing = store::fetch_round(db, tournament_id, &Round::ThirdPlace).await?;
                store::reconcile_round(
                    db,
                    tournament_id,
                    &Round::ThirdPlace,
                    &existing,
                    &[(l[0], l[1])],
                )
                .await?;
            }
        }
    }

    let finals = store::fetch_round(db, tournament_id, &Round::Final).await?;
    if let [only] = finals.as_slice() {
        if only.status == MatchStatus::Completed {
            let tournament = store::fetch_tournament(db, tournament_id).await?;
            if tournament.status != TournamentStatus::Completed {
                store::set_tournament_status(db, tournament_id, TournamentStatus::Completed)
                    .await?;
                log::info!("Tournament {tournament_id} completed");
            }
        }
    }
    Ok(())
}

/// Player on the winning side of the completed final, if there is one.
pub async fn get_winner(
    db: &dyn Database,
    tournament_id: TournamentId,
) -> Result<Option<Player>, TournamentError> {
    store::fetch_tournament(db, tournament_id).await?;
    let finals = store::fetch_round(db, tournament_id, &Round::Final).await?;
    let Some(winner_id) = finals.iter().find_map(GameMatch::winner) else {
        return Ok(None);
    };
    Ok(store::fetch_player(db, winner_id).await?)
}
