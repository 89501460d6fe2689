//! Knockout seeding: turn final group standings into the first knockout round.

use crate::db::Database;
use crate::logic::group_play::{load_standings_table, StandingsTable};
use crate::logic::store;
use crate::models::{PlayerId, Round, TournamentError, TournamentId};

/// First knockout round derived from the group tables.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Seeding {
    Semis([(PlayerId, PlayerId); 2]),
    Quarters([(PlayerId, PlayerId); 4]),
}

impl Seeding {
    pub fn round(&self) -> Round {
        match self {
            Seeding::Semis(_) => Round::Semi,
            Seeding::Quarters(_) => Round::Quarter,
        }
    }

    pub fn pairs(&self) -> &[(PlayerId, PlayerId)] {
        match self {
            Seeding::Semis(pairs) => pairs,
            Seeding::Quarters(pairs) => pairs,
        }
    }
}

/// Seed the first knockout round, or `None` when not enough players qualify.
///
/// Groups come in creation order; players in no group match form a trailing
/// `Overall` group and qualify like any other.
///
/// - One group: top four, semis 1v4 and 2v3.
/// - Two groups: top two of each, semis A1vB2 and B1vA2.
/// - More groups: top two of each pooled in group order; exactly eight are needed.
///   Quarters pair slot 0v3, 1v2, 4v7 and 5v6.
pub fn seed_bracket(table: &StandingsTable) -> Option<Seeding> {
    let groups = table.groups();
    match groups.as_slice() {
        [] => None,
        [(_, only)] => match only.as_slice() {
            [s1, s2, s3, s4, ..] => Some(Seeding::Semis([
                (s1.player_id, s4.player_id),
                (s2.player_id, s3.player_id),
            ])),
            _ => None,
        },
        [(_, a), (_, b)] => match (a.as_slice(), b.as_slice()) {
            ([a1, a2, ..], [b1, b2, ..]) => Some(Seeding::Semis([
                (a1.player_id, b2.player_id),
                (b1.player_id, a2.player_id),
            ])),
            _ => None,
        },
        _ => {
            let pool: Vec<PlayerId> = groups
                .iter()
                .flat_map(|(_, members)| members.iter().take(2).map(|s| s.player_id))
                .collect();
            match pool.as_slice() {
                &[p0, p1, p2, p3, p4, p5, p6, p7] => Some(Seeding::Quarters([
                    (p0, p3),
                    (p1, p2),
                    (p4, p7),
                    (p5, p6),
                ])),
                _ => None,
            }
        }
    }
}

/// Create or refresh the first knockout round once the whole group stage is played.
///
/// Does nothing while any group match is unplayed, or when the tournament has no
/// group matches at all. Declining for lack of qualifiers is not an error. The
/// bracket is recomputed from standings on every call and reconciled with the
/// stored rows, so repeated calls with the same results leave it untouched.
/// Returns the seeding that is now in place, if any.
pub async fn try_generate_knockout_matches(
    db: &dyn Database,
    tournament_id: TournamentId,
) -> Result<Option<Seeding>, TournamentError> {
    let group_matches = store::fetch_group_matches(db, tournament_id).await?;
    if group_matches.is_empty() {
        log::debug!("Tournament {tournament_id}: no group matches yet; knockouts not ready");
        return Ok(None);
    }
    if let Some(open) = group_matches.iter().find(|m| !m.is_completed()) {
        log::debug!(
            "Tournament {tournament_id}: group match {} still open; knockouts not ready",
            open.id
        );
        return Ok(None);
    }

    let table = load_standings_table(db, tournament_id).await?;
    let Some(seeding) = seed_bracket(&table) else {
        log::info!("Tournament {tournament_id}: not enough qualifiers for a knockout round");
        return Ok(None);
    };

    // Quarters cannot coexist with a semi-final seeding. Later rounds are left
    // for the advancer to reconcile once this round is played again.
    let stale = match seeding {
        Seeding::Semis(_) => vec![Round::Quarter],
        Seeding::Quarters(_) => vec![],
    };
    let round = seeding.round();

    let mut changed = store::delete_rounds(db, tournament_id, &stale).await? > 0;
    let existing = store::fetch_round(db, tournament_id, &round).await?;
    changed |= store::reconcile_round(db, tournament_id, &round, &existing, seeding.pairs()).await?;

    if changed {
        log::info!(
            "Tournament {tournament_id}: {round} seeded {:?}",
            seeding.pairs()
        );
    }
    Ok(Some(seeding))
}
