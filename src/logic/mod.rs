//! Tournament business logic: setup, group play, seeding, finals, and score progression.

mod finals;
mod group_play;
mod progression;
mod seeding;
mod setup;
mod store;

pub use finals::{get_winner, try_advance_knockout};
pub use group_play::{
    compute_standings, default_group_count, generate_matches, generate_matches_with_rng, rank,
    StandingsTable,
};
pub use progression::{
    Progression, ProgressionOptions, ScoreSubmission, ScoreUpdate, TournamentLocks,
};
pub use seeding::{seed_bracket, try_generate_knockout_matches, Seeding};
pub use setup::{
    add_player_to_tournament, create_player, create_tournament, delete_tournament,
    get_tournament, list_players, list_tournaments, remove_player_from_tournament,
    MAX_TOURNAMENT_NAME_LEN,
};
