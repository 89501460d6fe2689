//! Data structures for the league: players, tournaments, matches, standings rows.

mod game;
mod player;
mod tournament;

pub use game::{GameMatch, MatchId, MatchStatus, Round};
pub use player::{Player, PlayerId, PlayerStats, UNGROUPED_LABEL};
pub use tournament::{
    Entity, Tournament, TournamentError, TournamentId, TournamentStatus, TournamentWithDetails,
};
