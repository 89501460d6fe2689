//! Shared fixtures for the integration tests: an in-memory database and roster helpers.
#![allow(dead_code)]

use league_tournament::{
    add_player_to_tournament, create_player, create_tournament, get_tournament, GameMatch,
    Player, PlayerId, Progression, Round, ScoreUpdate, SqliteDatabase, TournamentId,
};

pub async fn db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory().await.unwrap();
    db.init_schema().await.unwrap();
    db
}

/// A pending tournament with the named players registered and rostered, in order.
pub async fn tournament_with_players<S: AsRef<str>>(
    db: &SqliteDatabase,
    names: &[S],
) -> (TournamentId, Vec<Player>) {
    let t = create_tournament(db, "Spring League").await.unwrap();
    let mut players = Vec::new();
    for name in names {
        let p = create_player(db, name.as_ref()).await.unwrap();
        add_player_to_tournament(db, t.id, p.id).await.unwrap();
        players.push(p);
    }
    (t.id, players)
}

pub fn numbered(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("P{i}")).collect()
}

pub async fn matches(db: &SqliteDatabase, tournament_id: TournamentId) -> Vec<GameMatch> {
    get_tournament(db, tournament_id).await.unwrap().matches
}

pub async fn round(db: &SqliteDatabase, tournament_id: TournamentId, round: Round) -> Vec<GameMatch> {
    matches(db, tournament_id)
        .await
        .into_iter()
        .filter(|m| m.round == round)
        .collect()
}

pub async fn group_matches(db: &SqliteDatabase, tournament_id: TournamentId) -> Vec<GameMatch> {
    matches(db, tournament_id)
        .await
        .into_iter()
        .filter(|m| m.round.is_group())
        .collect()
}

pub fn pairs(matches: &[GameMatch]) -> Vec<(PlayerId, PlayerId)> {
    matches.iter().map(GameMatch::participants).collect()
}

/// The match between `a` and `b`, whichever side each was stored on.
pub async fn find_match(
    db: &SqliteDatabase,
    tournament_id: TournamentId,
    a: PlayerId,
    b: PlayerId,
) -> GameMatch {
    matches(db, tournament_id)
        .await
        .into_iter()
        .find(|m| m.participants() == (a, b) || m.participants() == (b, a))
        .unwrap_or_else(|| panic!("no match between {a} and {b}"))
}

/// Score `a` v `b` as `score_a`-`score_b` from `a`'s side, swapping if the row is stored the other way round.
pub async fn play(
    progression: &Progression,
    db: &SqliteDatabase,
    tournament_id: TournamentId,
    (a, b): (PlayerId, PlayerId),
    (score_a, score_b): (u32, u32),
) -> ScoreUpdate {
    let m = find_match(db, tournament_id, a, b).await;
    let (score1, score2) = if m.player1_id == a {
        (score_a, score_b)
    } else {
        (score_b, score_a)
    };
    progression
        .update_match_score(db, m.id, score1, score2)
        .await
        .unwrap()
}

/// Four-player single group: A 2-1 B, C 0-0 D, A 3-0 C, B 1-1 D, A 1-2 D, B 2-0 C.
/// Final table: A 6 pts, D 5, B 4, C 1. Returns the tournament and `[A, B, C, D]` ids.
pub async fn play_four_player_group(
    progression: &Progression,
    db: &SqliteDatabase,
) -> (TournamentId, [PlayerId; 4]) {
    let (tid, players) = tournament_with_players(db, &["A", "B", "C", "D"]).await;
    let [a, b, c, d] = [players[0].id, players[1].id, players[2].id, players[3].id];
    progression.generate_matches(db, tid, None).await.unwrap();

    for (pair, score) in [
        ((a, b), (2, 1)),
        ((c, d), (0, 0)),
        ((a, c), (3, 0)),
        ((b, d), (1, 1)),
        ((a, d), (1, 2)),
        ((b, c), (2, 0)),
    ] {
        play(progression, db, tid, pair, score).await;
    }
    (tid, [a, b, c, d])
}
