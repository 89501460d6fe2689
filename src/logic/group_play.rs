//! Group stage: round-robin match generation and the standings table.

use crate::db::Database;
use crate::logic::store;
use crate::models::{
    GameMatch, Player, PlayerId, PlayerStats, Round, TournamentError, TournamentId,
    TournamentStatus, UNGROUPED_LABEL,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Number of groups used when the caller does not ask for one:
/// up to 10 players play one group, up to 20 play two, larger fields play four.
pub fn default_group_count(players: usize) -> usize {
    match players {
        0..=10 => 1,
        11..=20 => 2,
        _ => 4,
    }
}

/// Generate the group stage for a tournament, replacing any existing matches.
///
/// 1. Shuffle the roster and deal players into groups (`idx % group_count`).
/// 2. Every group with at least two players gets a full round robin, labelled `group-1`, `group-2`, ...
/// 3. The tournament moves to `in_progress`.
pub async fn generate_matches(
    db: &dyn Database,
    tournament_id: TournamentId,
    group_count: Option<usize>,
) -> Result<Vec<GameMatch>, TournamentError> {
    generate_matches_with_rng(db, tournament_id, group_count, &mut StdRng::from_entropy()).await
}

/// [`generate_matches`] with a caller-supplied shuffle source.
pub async fn generate_matches_with_rng<R: Rng>(
    db: &dyn Database,
    tournament_id: TournamentId,
    group_count: Option<usize>,
    rng: &mut R,
) -> Result<Vec<GameMatch>, TournamentError> {
    let tournament = store::fetch_tournament(db, tournament_id).await?;
    if tournament.status == TournamentStatus::Completed {
        return Err(TournamentError::Conflict(
            "Cannot regenerate matches for a completed tournament".to_owned(),
        ));
    }

    let mut player_ids: Vec<PlayerId> = store::fetch_roster(db, tournament_id)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();
    if player_ids.len() < 2 {
        return Err(TournamentError::InsufficientParticipants {
            required: 2,
            found: player_ids.len(),
        });
    }

    let group_count = group_count.unwrap_or_else(|| default_group_count(player_ids.len()));
    if group_count == 0 || group_count > player_ids.len() {
        return Err(TournamentError::Validation(format!(
            "Group count must be between 1 and {}",
            player_ids.len()
        )));
    }

    db.execute(
        "DELETE FROM matches WHERE tournament_id = ?",
        &[tournament_id.into()],
    )
    .await?;

    player_ids.shuffle(rng);
    let mut groups: Vec<Vec<PlayerId>> = vec![Vec::new(); group_count];
    for (idx, id) in player_ids.into_iter().enumerate() {
        groups[idx % group_count].push(id);
    }

    for (n, group) in groups.iter().enumerate() {
        let round = Round::group(n + 1);
        for (i, &a) in group.iter().enumerate() {
            for &b in &group[i + 1..] {
                store::insert_match(db, tournament_id, (a, b), &round).await?;
            }
        }
    }

    store::set_tournament_status(db, tournament_id, TournamentStatus::InProgress).await?;
    log::info!(
        "Tournament {} group stage generated: {} group(s)",
        tournament_id,
        group_count
    );

    Ok(store::fetch_matches(db, tournament_id).await?)
}

/// Standings table plus the order in which groups were created.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StandingsTable {
    /// All rostered players, sorted by the tie-break order.
    pub players: Vec<PlayerStats>,
    /// Group labels in order of their first match, then `Overall` if anyone is ungrouped.
    pub group_order: Vec<String>,
}

impl StandingsTable {
    /// Build the table from the roster and the tournament's group matches (any status, id order).
    ///
    /// Each player's group is the group of the first match they appear in. Only
    /// completed matches count towards the numbers; matches naming a player who is
    /// not on the roster are ignored.
    pub fn tally(roster: &[Player], group_matches: &[GameMatch]) -> Self {
        let mut players: Vec<PlayerStats> = roster.iter().map(PlayerStats::new).collect();
        let index: HashMap<PlayerId, usize> = players
            .iter()
            .enumerate()
            .map(|(i, s)| (s.player_id, i))
            .collect();

        let mut group_order: Vec<String> = Vec::new();
        for m in group_matches {
            let Some(label) = m.round.group_label() else {
                continue;
            };
            for id in [m.player1_id, m.player2_id] {
                if let Some(&i) = index.get(&id) {
                    if players[i].group.is_empty() {
                        players[i].group = label.clone();
                    }
                }
            }
            if !group_order.contains(&label) {
                group_order.push(label);
            }
        }
        let mut ungrouped = false;
        for s in players.iter_mut().filter(|s| s.group.is_empty()) {
            s.group = UNGROUPED_LABEL.to_owned();
            ungrouped = true;
        }
        if ungrouped {
            group_order.push(UNGROUPED_LABEL.to_owned());
        }

        for m in group_matches.iter().filter(|m| m.is_completed()) {
            let (Some(score1), Some(score2)) = (m.score1, m.score2) else {
                continue;
            };
            let (Some(&a), Some(&b)) = (index.get(&m.player1_id), index.get(&m.player2_id)) else {
                log::debug!("match {} names a player outside the roster; skipped", m.id);
                continue;
            };
            players[a].record(score1, score2);
            players[b].record(score2, score1);
        }

        players.sort_by(rank);
        Self {
            players,
            group_order,
        }
    }

    /// Each group's players in table order, groups in creation order.
    pub fn groups(&self) -> Vec<(&str, Vec<&PlayerStats>)> {
        self.group_order
            .iter()
            .map(|label| {
                let members = self.players.iter().filter(|s| &s.group == label).collect();
                (label.as_str(), members)
            })
            .collect()
    }
}

/// Tie-break order: points, then goal difference, then goals scored, all descending.
pub fn rank(a: &PlayerStats, b: &PlayerStats) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.goal_diff.cmp(&a.goal_diff))
        .then(b.goals_for.cmp(&a.goals_for))
}

pub(crate) async fn load_standings_table(
    db: &dyn Database,
    tournament_id: TournamentId,
) -> Result<StandingsTable, TournamentError> {
    let roster = store::fetch_roster(db, tournament_id).await?;
    let group_matches = store::fetch_group_matches(db, tournament_id).await?;
    Ok(StandingsTable::tally(&roster, &group_matches))
}

/// Current standings for every rostered player, best first. Read-only.
pub async fn compute_standings(
    db: &dyn Database,
    tournament_id: TournamentId,
) -> Result<Vec<PlayerStats>, TournamentError> {
    store::fetch_tournament(db, tournament_id).await?;
    Ok(load_standings_table(db, tournament_id).await?.players)
}
