//! Tournament, TournamentStatus, and the engine's error type.

use crate::db::{DbError, Row};
use crate::models::game::GameMatch;
use crate::models::player::Player;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Adapter-assigned identifier for a tournament.
pub type TournamentId = i64;

/// Kind of record a lookup failed to find.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Entity {
    Player,
    Tournament,
    Match,
    RosterEntry,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Player => "Player",
            Entity::Tournament => "Tournament",
            Entity::Match => "Match",
            Entity::RosterEntry => "Player in this tournament",
        })
    }
}

/// Errors that can occur during tournament operations.
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    /// Rejected input; nothing was written.
    #[error("{0}")]
    Validation(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },
    /// Duplicate roster entry, or a change the tournament's status does not allow.
    #[error("{0}")]
    Conflict(String),
    #[error("Need at least {required} players (found {found})")]
    InsufficientParticipants { required: usize, found: usize },
    /// A write did not read back the way it was written.
    #[error("inconsistent state: {0}")]
    InconsistentState(String),
    #[error(transparent)]
    Database(#[from] DbError),
}

impl TournamentError {
    pub fn not_found(entity: Entity, id: i64) -> Self {
        TournamentError::NotFound { entity, id }
    }
}

/// Lifecycle of a tournament. Only ever moves forward.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Roster open; no matches yet.
    #[default]
    Pending,
    /// Matches generated; group stage or knockouts running.
    InProgress,
    /// Final played.
    Completed,
}

impl TournamentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TournamentStatus::Pending => "pending",
            TournamentStatus::InProgress => "in_progress",
            TournamentStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TournamentStatus::Pending),
            "in_progress" => Some(TournamentStatus::InProgress),
            "completed" => Some(TournamentStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
}

impl Tournament {
    pub fn from_row(row: &Row) -> Result<Self, DbError> {
        let status = row.get_str("status")?;
        Ok(Self {
            id: row.get_i64("id")?,
            name: row.get_str("name")?.to_owned(),
            status: TournamentStatus::parse(status).ok_or_else(|| DbError::InvalidValue {
                column: "status".to_owned(),
                value: status.to_owned(),
            })?,
        })
    }
}

/// Tournament with its roster and every match, as listed to the UI.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentWithDetails {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub players: Vec<Player>,
    pub matches: Vec<GameMatch>,
}
