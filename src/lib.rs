//! League tournament manager: library with models, persistence, and progression logic.

pub mod config;
pub mod db;
pub mod logic;
pub mod models;

pub use config::Config;
pub use db::{Database, DbError, SqliteDatabase};
pub use logic::{
    add_player_to_tournament, compute_standings, create_player, create_tournament,
    delete_tournament, generate_matches, generate_matches_with_rng, get_tournament, get_winner,
    list_players, list_tournaments, remove_player_from_tournament, seed_bracket,
    try_advance_knockout, try_generate_knockout_matches, Progression, ProgressionOptions,
    ScoreSubmission, ScoreUpdate, Seeding, StandingsTable,
};
pub use models::{
    Entity, GameMatch, MatchId, MatchStatus, Player, PlayerId, PlayerStats, Round, Tournament,
    TournamentError, TournamentId, TournamentStatus, TournamentWithDetails,
};
