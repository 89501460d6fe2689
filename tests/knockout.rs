//! Integration tests for knockout advancement: quarters, semis, final, third place.

mod common;

use common::{db, group_matches, pairs, play_four_player_group, round, tournament_with_players};
use league_tournament::{
    get_tournament, get_winner, try_advance_knockout, GameMatch, PlayerId, Progression,
    ProgressionOptions, Round, TournamentError, TournamentStatus,
};
use std::collections::BTreeSet;

/// Sorted member ids of each group, by group number.
async fn group_members(
    db: &league_tournament::SqliteDatabase,
    tid: i64,
    groups: usize,
) -> Vec<Vec<PlayerId>> {
    let all = group_matches(db, tid).await;
    (1..=groups)
        .map(|n| {
            let ids: BTreeSet<PlayerId> = all
                .iter()
                .filter(|m| m.round == Round::group(n))
                .flat_map(|m| [m.player1_id, m.player2_id])
                .collect();
            ids.into_iter().collect()
        })
        .collect()
}

#[tokio::test]
async fn sixteen_players_play_through_to_a_champion() {
    let db = db().await;
    let progression = Progression::default();
    let (tid, _) = tournament_with_players(&db, &common::numbered(16)).await;
    progression.generate_matches(&db, tid, Some(4)).await.unwrap();

    let groups = group_members(&db, tid, 4).await;
    assert!(groups.iter().all(|g| g.len() == 4));

    // lower id always wins, so each group finishes in id order
    for m in group_matches(&db, tid).await {
        let (s1, s2) = if m.player1_id < m.player2_id { (1, 0) } else { (0, 1) };
        progression
            .update_match_score(&db, m.id, s1, s2)
            .await
            .unwrap();
    }

    let quarters = round(&db, tid, Round::Quarter).await;
    assert_eq!(
        pairs(&quarters),
        vec![
            (groups[0][0], groups[1][1]),
            (groups[0][1], groups[1][0]),
            (groups[2][0], groups[3][1]),
            (groups[2][1], groups[3][0]),
        ]
    );
    assert!(round(&db, tid, Round::Semi).await.is_empty());

    for (i, q) in quarters.iter().enumerate() {
        progression.update_match_score(&db, q.id, 2, 1).await.unwrap();
        let semis = round(&db, tid, Round::Semi).await;
        assert_eq!(semis.is_empty(), i < 3);
    }
    let w: Vec<PlayerId> = quarters.iter().map(|q| q.player1_id).collect();
    let semis = round(&db, tid, Round::Semi).await;
    assert_eq!(pairs(&semis), vec![(w[0], w[3]), (w[1], w[2])]);

    for s in &semis {
        let update = progression.update_match_score(&db, s.id, 1, 0).await.unwrap();
        assert_eq!(update.winner, None);
    }
    let finals = round(&db, tid, Round::Final).await;
    assert_eq!(pairs(&finals), vec![(w[0], w[1])]);
    assert!(round(&db, tid, Round::ThirdPlace).await.is_empty());

    let update = progression
        .update_match_score(&db, finals[0].id, 3, 1)
        .await
        .unwrap();
    assert!(update.game_match.is_completed());
    assert_eq!(update.winner.map(|p| p.id), Some(groups[0][0]));

    let t = get_tournament(&db, tid).await.unwrap();
    assert_eq!(t.tournament.status, TournamentStatus::Completed);
    assert_eq!(
        get_winner(&db, tid).await.unwrap().map(|p| p.id),
        Some(groups[0][0])
    );
}

/// Sixteen players in four groups with the group stage played (lower id always wins).
/// Returns the sorted group members and the seeded quarter-finals.
async fn sixteen_player_quarters(
    progression: &Progression,
    db: &league_tournament::SqliteDatabase,
) -> (i64, Vec<Vec<PlayerId>>, Vec<GameMatch>) {
    let (tid, _) = tournament_with_players(db, &common::numbered(16)).await;
    progression.generate_matches(db, tid, Some(4)).await.unwrap();
    let groups = group_members(db, tid, 4).await;
    for m in group_matches(db, tid).await {
        let (s1, s2) = if m.player1_id < m.player2_id { (1, 0) } else { (0, 1) };
        progression
            .update_match_score(db, m.id, s1, s2)
            .await
            .unwrap();
    }
    let quarters = round(db, tid, Round::Quarter).await;
    assert_eq!(quarters.len(), 4);
    (tid, groups, quarters)
}

#[tokio::test]
async fn quarter_rescore_updates_semis_in_place() {
    let db = db().await;
    let progression = Progression::default();
    let (tid, _, quarters) = sixteen_player_quarters(&progression, &db).await;
    for q in &quarters {
        progression.update_match_score(&db, q.id, 2, 1).await.unwrap();
    }
    let semis = round(&db, tid, Round::Semi).await;
    progression.update_match_score(&db, semis[1].id, 1, 0).await.unwrap();
    let before = round(&db, tid, Round::Semi).await;

    // same winner, different score: the semis do not move
    progression.update_match_score(&db, quarters[1].id, 3, 0).await.unwrap();
    assert_eq!(round(&db, tid, Round::Semi).await, before);

    // the other side now wins the first quarter
    progression.update_match_score(&db, quarters[0].id, 0, 1).await.unwrap();
    let after = round(&db, tid, Round::Semi).await;
    assert_eq!(after.len(), 2);
    assert_eq!(after[0].id, before[0].id);
    assert_eq!(
        after[0].participants(),
        (quarters[0].player2_id, quarters[3].player1_id)
    );
    assert!(!after[0].is_completed());
    // the second semi is untouched, result included
    assert_eq!(after[1], before[1]);
}

#[tokio::test]
async fn final_survives_an_upstream_rescore() {
    let db = db().await;
    let progression = Progression::default();
    let (tid, groups, quarters) = sixteen_player_quarters(&progression, &db).await;
    for q in &quarters {
        progression.update_match_score(&db, q.id, 2, 1).await.unwrap();
    }
    for s in round(&db, tid, Round::Semi).await {
        progression.update_match_score(&db, s.id, 1, 0).await.unwrap();
    }
    let final_id = round(&db, tid, Round::Final).await[0].id;
    progression.update_match_score(&db, final_id, 3, 1).await.unwrap();

    // overturn a quarter after the tournament is over
    progression.update_match_score(&db, quarters[0].id, 0, 1).await.unwrap();
    let finals = round(&db, tid, Round::Final).await;
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].id, final_id);
    assert!(finals[0].is_completed());
    let t = get_tournament(&db, tid).await.unwrap();
    assert_eq!(t.tournament.status, TournamentStatus::Completed);
    assert_eq!(
        get_winner(&db, tid).await.unwrap().map(|p| p.id),
        Some(groups[0][0])
    );

    // replaying the reassigned semi rewrites the same final row
    let semis = round(&db, tid, Round::Semi).await;
    progression.update_match_score(&db, semis[0].id, 1, 0).await.unwrap();
    let finals = round(&db, tid, Round::Final).await;
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].id, final_id);
    assert_eq!(
        finals[0].participants(),
        (quarters[0].player2_id, quarters[1].player1_id)
    );
    assert!(!finals[0].is_completed());

    let update = progression.update_match_score(&db, final_id, 2, 0).await.unwrap();
    assert_eq!(update.winner.map(|p| p.id), Some(quarters[0].player2_id));
}

#[tokio::test]
async fn semi_rescore_updates_final_in_place() {
    let db = db().await;
    let progression = Progression::default();
    let (tid, [a, b, _c, d]) = play_four_player_group(&progression, &db).await;
    let semis = round(&db, tid, Round::Semi).await;

    // semis are A v C and D v B
    progression.update_match_score(&db, semis[0].id, 2, 0).await.unwrap();
    progression.update_match_score(&db, semis[1].id, 1, 0).await.unwrap();
    let before = round(&db, tid, Round::Final).await;
    assert_eq!(pairs(&before), vec![(a, d)]);

    progression.update_match_score(&db, semis[1].id, 0, 1).await.unwrap();
    let after = round(&db, tid, Round::Final).await;
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id, before[0].id);
    assert_eq!(after[0].participants(), (a, b));
    assert!(!after[0].is_completed());
}

#[tokio::test]
async fn third_place_match_when_enabled() {
    let db = db().await;
    let progression = Progression::new(ProgressionOptions {
        third_place_match: true,
    });
    assert!(progression.options().third_place_match);
    let (tid, [a, b, c, d]) = play_four_player_group(&progression, &db).await;
    let semis = round(&db, tid, Round::Semi).await;

    progression.update_match_score(&db, semis[0].id, 2, 0).await.unwrap();
    assert!(round(&db, tid, Round::ThirdPlace).await.is_empty());
    progression.update_match_score(&db, semis[1].id, 1, 0).await.unwrap();

    assert_eq!(pairs(&round(&db, tid, Round::Final).await), vec![(a, d)]);
    let third = round(&db, tid, Round::ThirdPlace).await;
    assert_eq!(pairs(&third), vec![(c, b)]);

    // playing the third-place match does not finish the tournament
    progression.update_match_score(&db, third[0].id, 1, 0).await.unwrap();
    let t = get_tournament(&db, tid).await.unwrap();
    assert_eq!(t.tournament.status, TournamentStatus::InProgress);
}

#[tokio::test]
async fn knockout_draw_is_rejected() {
    let db = db().await;
    let progression = Progression::default();
    let (tid, _) = play_four_player_group(&progression, &db).await;
    let semi = round(&db, tid, Round::Semi).await.remove(0);

    assert!(matches!(
        progression.update_match_score(&db, semi.id, 1, 1).await,
        Err(TournamentError::Validation(_))
    ));
    let unchanged = round(&db, tid, Round::Semi).await.remove(0);
    assert_eq!(unchanged, semi);
}

#[tokio::test]
async fn advancing_is_idempotent() {
    let db = db().await;
    let progression = Progression::default();
    let (tid, _) = play_four_player_group(&progression, &db).await;
    let semis = round(&db, tid, Round::Semi).await;
    progression.update_match_score(&db, semis[0].id, 2, 0).await.unwrap();
    progression.update_match_score(&db, semis[1].id, 1, 0).await.unwrap();

    let before = common::matches(&db, tid).await;
    for _ in 0..3 {
        try_advance_knockout(&db, tid, ProgressionOptions::default())
            .await
            .unwrap();
    }
    assert_eq!(common::matches(&db, tid).await, before);
}

#[tokio::test]
async fn winner_is_empty_until_the_final_is_played() {
    let db = db().await;
    let progression = Progression::default();
    let (tid, _) = play_four_player_group(&progression, &db).await;
    assert_eq!(get_winner(&db, tid).await.unwrap(), None);
    assert!(matches!(
        get_winner(&db, 404).await,
        Err(TournamentError::NotFound { .. })
    ));
}
