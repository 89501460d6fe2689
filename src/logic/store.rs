//! Typed reads and writes over the `Database` contract, shared by the logic modules.

use crate::db::{Database, DbError};
use crate::models::{
    Entity, GameMatch, MatchId, MatchStatus, Player, PlayerId, Round, Tournament, TournamentError,
    TournamentId, TournamentStatus,
};

pub(crate) async fn fetch_tournament(
    db: &dyn Database,
    tournament_id: TournamentId,
) -> Result<Tournament, TournamentError> {
    let row = db
        .query_one("SELECT * FROM tournaments WHERE id = ?", &[tournament_id.into()])
        .await?
        .ok_or_else(|| TournamentError::not_found(Entity::Tournament, tournament_id))?;
    Ok(Tournament::from_row(&row)?)
}

pub(crate) async fn fetch_player(
    db: &dyn Database,
    player_id: PlayerId,
) -> Result<Option<Player>, DbError> {
    db.query_one("SELECT * FROM players WHERE id = ?", &[player_id.into()])
        .await?
        .as_ref()
        .map(Player::from_row)
        .transpose()
}

/// Rostered players in id order.
pub(crate) async fn fetch_roster(
    db: &dyn Database,
    tournament_id: TournamentId,
) -> Result<Vec<Player>, DbError> {
    db.query(
        "SELECT p.id, p.name FROM tournament_players tp
         JOIN players p ON p.id = tp.player_id
         WHERE tp.tournament_id = ?
         ORDER BY p.id",
        &[tournament_id.into()],
    )
    .await?
    .iter()
    .map(Player::from_row)
    .collect()
}

pub(crate) async fn fetch_match(
    db: &dyn Database,
    match_id: MatchId,
) -> Result<Option<GameMatch>, DbError> {
    db.query_one("SELECT * FROM matches WHERE id = ?", &[match_id.into()])
        .await?
        .as_ref()
        .map(GameMatch::from_row)
        .transpose()
}

/// Every match of the tournament in id order.
pub(crate) async fn fetch_matches(
    db: &dyn Database,
    tournament_id: TournamentId,
) -> Result<Vec<GameMatch>, DbError> {
    db.query(
        "SELECT * FROM matches WHERE tournament_id = ? ORDER BY id",
        &[tournament_id.into()],
    )
    .await?
    .iter()
    .map(GameMatch::from_row)
    .collect()
}

/// Group-stage matches (`group-<suffix>` and legacy `group`) in id order, any status.
/// GLOB is case-sensitive and needs a non-empty suffix, exactly like `Round::parse`.
pub(crate) async fn fetch_group_matches(
    db: &dyn Database,
    tournament_id: TournamentId,
) -> Result<Vec<GameMatch>, DbError> {
    db.query(
        "SELECT * FROM matches
         WHERE tournament_id = ? AND (round = 'group' OR round GLOB 'group-?*')
         ORDER BY id",
        &[tournament_id.into()],
    )
    .await?
    .iter()
    .map(GameMatch::from_row)
    .collect()
}

/// Matches of one knockout round in id order.
pub(crate) async fn fetch_round(
    db: &dyn Database,
    tournament_id: TournamentId,
    round: &Round,
) -> Result<Vec<GameMatch>, DbError> {
    db.query(
        "SELECT * FROM matches WHERE tournament_id = ? AND round = ? ORDER BY id",
        &[tournament_id.into(), round.to_string().into()],
    )
    .await?
    .iter()
    .map(GameMatch::from_row)
    .collect()
}

pub(crate) async fn insert_match(
    db: &dyn Database,
    tournament_id: TournamentId,
    (player1_id, player2_id): (PlayerId, PlayerId),
    round: &Round,
) -> Result<MatchId, DbError> {
    db.execute(
        "INSERT INTO matches (tournament_id, player1_id, player2_id, round, status)
         VALUES (?, ?, ?, ?, ?)",
        &[
            tournament_id.into(),
            player1_id.into(),
            player2_id.into(),
            round.to_string().into(),
            MatchStatus::Scheduled.as_str().into(),
        ],
    )
    .await?
    .insert_id
    .ok_or(DbError::MissingInsertId)
}

/// Put new participants on an existing row, clearing its result.
async fn reassign_match(
    db: &dyn Database,
    match_id: MatchId,
    (player1_id, player2_id): (PlayerId, PlayerId),
) -> Result<(), DbError> {
    db.execute(
        "UPDATE matches SET player1_id = ?, player2_id = ?, score1 = NULL, score2 = NULL, status = ?
         WHERE id = ?",
        &[
            player1_id.into(),
            player2_id.into(),
            MatchStatus::Scheduled.as_str().into(),
            match_id.into(),
        ],
    )
    .await?;
    Ok(())
}

async fn delete_match(db: &dyn Database, match_id: MatchId) -> Result<(), DbError> {
    db.execute("DELETE FROM matches WHERE id = ?", &[match_id.into()])
        .await?;
    Ok(())
}

/// Remove every match of the given rounds. Returns the number of rows deleted.
pub(crate) async fn delete_rounds(
    db: &dyn Database,
    tournament_id: TournamentId,
    rounds: &[Round],
) -> Result<u64, DbError> {
    let mut deleted = 0;
    for round in rounds {
        deleted += db
            .execute(
                "DELETE FROM matches WHERE tournament_id = ? AND round = ?",
                &[tournament_id.into(), round.to_string().into()],
            )
            .await?
            .rows_affected;
    }
    Ok(deleted)
}

pub(crate) async fn set_tournament_status(
    db: &dyn Database,
    tournament_id: TournamentId,
    status: TournamentStatus,
) -> Result<(), DbError> {
    db.execute(
        "UPDATE tournaments SET status = ? WHERE id = ?",
        &[status.as_str().into(), tournament_id.into()],
    )
    .await?;
    Ok(())
}

/// Make the rows of `round` match `desired`, pairing them positionally by id order.
///
/// A row whose participants already match is left alone (keeping its result),
/// a differing row is updated in place and reset to scheduled, missing rows are
/// inserted, and rows beyond `desired` are deleted. Returns whether anything changed.
pub(crate) async fn reconcile_round(
    db: &dyn Database,
    tournament_id: TournamentId,
    round: &Round,
    existing: &[GameMatch],
    desired: &[(PlayerId, PlayerId)],
) -> Result<bool, DbError> {
    let mut changed = false;
    for (idx, &pair) in desired.iter().enumerate() {
        match existing.get(idx) {
            Some(m) if m.participants() == pair => {}
            Some(m) => {
                log::debug!("{round} match {} reassigned to {pair:?}", m.id);
                reassign_match(db, m.id, pair).await?;
                changed = true;
            }
            None => {
                let id = insert_match(db, tournament_id, pair, round).await?;
                log::debug!("{round} match {id} created for {pair:?}");
                changed = true;
            }
        }
    }
    for m in existing.iter().skip(desired.len()) {
        log::debug!("surplus {round} match {} deleted", m.id);
        delete_match(db, m.id).await?;
        changed = true;
    }
    Ok(changed)
}
