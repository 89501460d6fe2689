//! Player and PlayerStats data structures.

use crate::db::{DbError, Row};
use serde::{Deserialize, Serialize};

/// Adapter-assigned identifier for a player.
pub type PlayerId = i64;

/// A registered player. Immutable once created.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn from_row(row: &Row) -> Result<Self, DbError> {
        Ok(Self {
            id: row.get_i64("id")?,
            name: row.get_str("name")?.to_owned(),
        })
    }
}

/// Label given to rostered players that appear in no group match.
pub const UNGROUPED_LABEL: &str = "Overall";

/// Group-stage table row for one player. Derived from completed group matches, never stored.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub name: String,
    pub group: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: i64,
    pub goals_against: i64,
    pub goal_diff: i64,
    pub points: u32,
}

impl PlayerStats {
    /// Zeroed row for a rostered player; the group label is filled in later.
    pub fn new(player: &Player) -> Self {
        Self {
            player_id: player.id,
            name: player.name.clone(),
            ..Self::default()
        }
    }

    /// Fold one finished group match from this player's side.
    pub fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.goals_for += i64::from(scored);
        self.goals_against += i64::from(conceded);
        if scored > conceded {
            self.wins += 1;
            self.points += 3;
        } else if scored < conceded {
            self.losses += 1;
        } else {
            self.draws += 1;
            self.points += 1;
        }
        self.goal_diff = self.goals_for - self.goals_against;
    }
}
