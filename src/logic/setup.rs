//! Setup phase: players, tournaments, and tournament rosters.

use crate::db::{Database, DbError};
use crate::logic::store;
use crate::models::{
    Entity, Player, PlayerId, Tournament, TournamentError, TournamentId, TournamentStatus,
    TournamentWithDetails,
};

/// Longest accepted tournament name, in characters.
pub const MAX_TOURNAMENT_NAME_LEN: usize = 100;

fn required_name<'a>(what: &str, name: &'a str) -> Result<&'a str, TournamentError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::Validation(format!("{what} name is required")));
    }
    Ok(name)
}

/// Register a new player. The name is trimmed and must not be empty.
pub async fn create_player(db: &dyn Database, name: &str) -> Result<Player, TournamentError> {
    let name = required_name("Player", name)?;
    let res = db
        .execute("INSERT INTO players (name) VALUES (?)", &[name.into()])
        .await?;
    let id = res.insert_id.ok_or(DbError::MissingInsertId)?;
    log::info!("Player {id} registered: {name}");
    Ok(Player {
        id,
        name: name.to_owned(),
    })
}

/// All players, by name.
pub async fn list_players(db: &dyn Database) -> Result<Vec<Player>, TournamentError> {
    let rows = db.query("SELECT * FROM players ORDER BY name, id", &[]).await?;
    Ok(rows.iter().map(Player::from_row).collect::<Result<_, _>>()?)
}

/// Create a tournament in `pending` state. Names are trimmed, non-empty, and at most 100 characters.
pub async fn create_tournament(
    db: &dyn Database,
    name: &str,
) -> Result<Tournament, TournamentError> {
    let name = required_name("Tournament", name)?;
    if name.chars().count() > MAX_TOURNAMENT_NAME_LEN {
        return Err(TournamentError::Validation(format!(
            "Tournament name cannot exceed {MAX_TOURNAMENT_NAME_LEN} characters"
        )));
    }
    let status = TournamentStatus::Pending;
    let res = db
        .execute(
            "INSERT INTO tournaments (name, status) VALUES (?, ?)",
            &[name.into(), status.as_str().into()],
        )
        .await?;
    let id = res.insert_id.ok_or(DbError::MissingInsertId)?;
    log::info!("Tournament {id} created: {name}");
    Ok(Tournament {
        id,
        name: name.to_owned(),
        status,
    })
}

/// One tournament with its roster and matches.
pub async fn get_tournament(
    db: &dyn Database,
    tournament_id: TournamentId,
) -> Result<TournamentWithDetails, TournamentError> {
    let tournament = store::fetch_tournament(db, tournament_id).await?;
    with_details(db, tournament).await
}

/// Every tournament with roster and matches, newest first.
pub async fn list_tournaments(
    db: &dyn Database,
) -> Result<Vec<TournamentWithDetails>, TournamentError> {
    let rows = db
        .query("SELECT * FROM tournaments ORDER BY id DESC", &[])
        .await?;
    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        out.push(with_details(db, Tournament::from_row(row)?).await?);
    }
    Ok(out)
}

async fn with_details(
    db: &dyn Database,
    tournament: Tournament,
) -> Result<TournamentWithDetails, TournamentError> {
    let players = store::fetch_roster(db, tournament.id).await?;
    let matches = store::fetch_matches(db, tournament.id).await?;
    Ok(TournamentWithDetails {
        tournament,
        players,
        matches,
    })
}

async fn is_rostered(
    db: &dyn Database,
    tournament_id: TournamentId,
    player_id: PlayerId,
) -> Result<bool, TournamentError> {
    Ok(db
        .query_one(
            "SELECT * FROM tournament_players WHERE tournament_id = ? AND player_id = ?",
            &[tournament_id.into(), player_id.into()],
        )
        .await?
        .is_some())
}

/// Add a player to a tournament's roster (tournament must be `pending`).
pub async fn add_player_to_tournament(
    db: &dyn Database,
    tournament_id: TournamentId,
    player_id: PlayerId,
) -> Result<(), TournamentError> {
    let tournament = store::fetch_tournament(db, tournament_id).await?;
    if store::fetch_player(db, player_id).await?.is_none() {
        return Err(TournamentError::not_found(Entity::Player, player_id));
    }
    if tournament.status != TournamentStatus::Pending {
        return Err(TournamentError::Conflict(
            "Can only add players to pending tournaments".to_owned(),
        ));
    }
    if is_rostered(db, tournament_id, player_id).await? {
        return Err(TournamentError::Conflict(format!(
            "Player {player_id} is already in this tournament"
        )));
    }
    db.execute(
        "INSERT INTO tournament_players (tournament_id, player_id) VALUES (?, ?)",
        &[tournament_id.into(), player_id.into()],
    )
    .await?;
    log::debug!("Tournament {tournament_id}: player {player_id} added");
    Ok(())
}

/// Take a player off a tournament's roster (tournament must be `pending`). The player record stays.
pub async fn remove_player_from_tournament(
    db: &dyn Database,
    tournament_id: TournamentId,
    player_id: PlayerId,
) -> Result<(), TournamentError> {
    let tournament = store::fetch_tournament(db, tournament_id).await?;
    if tournament.status != TournamentStatus::Pending {
        return Err(TournamentError::Conflict(
            "Can only remove players from pending tournaments".to_owned(),
        ));
    }
    if !is_rostered(db, tournament_id, player_id).await? {
        return Err(TournamentError::not_found(Entity::RosterEntry, player_id));
    }
    db.execute(
        "DELETE FROM tournament_players WHERE tournament_id = ? AND player_id = ?",
        &[tournament_id.into(), player_id.into()],
    )
    .await?;
    log::debug!("Tournament {tournament_id}: player {player_id} removed");
    Ok(())
}

/// Delete a tournament with its matches and roster. Players are kept.
pub async fn delete_tournament(
    db: &dyn Database,
    tournament_id: TournamentId,
) -> Result<(), TournamentError> {
    store::fetch_tournament(db, tournament_id).await?;
    for sql in [
        "DELETE FROM matches WHERE tournament_id = ?",
        "DELETE FROM tournament_players WHERE tournament_id = ?",
        "DELETE FROM tournaments WHERE id = ?",
    ] {
        db.execute(sql, &[tournament_id.into()]).await?;
    }
    log::info!("Tournament {tournament_id} deleted");
    Ok(())
}
