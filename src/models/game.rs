//! Match rows, rounds, and match status.

use crate::db::{DbError, Row};
use crate::models::player::PlayerId;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Adapter-assigned identifier for a match.
pub type MatchId = i64;

/// Stage a match belongs to, stored as a text token in the `round` column.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Round {
    /// `group-<suffix>`, or the legacy bare `group` when the suffix is `None`.
    Group(Option<String>),
    Quarter,
    Semi,
    Final,
    ThirdPlace,
}

impl Round {
    pub const QUARTER: &'static str = "quarter";
    pub const SEMI: &'static str = "semi";
    pub const FINAL: &'static str = "final";
    pub const THIRD_PLACE: &'static str = "third-place";

    /// Round token for the `n`th group (1-based).
    pub fn group(n: usize) -> Self {
        Round::Group(Some(n.to_string()))
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "group" => Some(Round::Group(None)),
            Self::QUARTER => Some(Round::Quarter),
            Self::SEMI => Some(Round::Semi),
            Self::FINAL => Some(Round::Final),
            Self::THIRD_PLACE => Some(Round::ThirdPlace),
            _ => token
                .strip_prefix("group-")
                .filter(|suffix| !suffix.is_empty())
                .map(|suffix| Round::Group(Some(suffix.to_owned()))),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Round::Group(_))
    }

    /// Display label for a group round: `group-1` becomes `GROUP 1`, `group` becomes `GROUP`.
    pub fn group_label(&self) -> Option<String> {
        match self {
            Round::Group(Some(suffix)) => Some(format!("GROUP {}", suffix.to_uppercase())),
            Round::Group(None) => Some("GROUP".to_owned()),
            _ => None,
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Round::Group(Some(suffix)) => write!(f, "group-{suffix}"),
            Round::Group(None) => f.write_str("group"),
            Round::Quarter => f.write_str(Self::QUARTER),
            Round::Semi => f.write_str(Self::SEMI),
            Round::Final => f.write_str(Self::FINAL),
            Round::ThirdPlace => f.write_str(Self::THIRD_PLACE),
        }
    }
}

impl From<Round> for String {
    fn from(round: Round) -> Self {
        round.to_string()
    }
}

impl TryFrom<String> for Round {
    type Error = String;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        Round::parse(&token).ok_or_else(|| format!("unknown round {token:?}"))
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Completed,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(MatchStatus::Scheduled),
            "completed" => Some(MatchStatus::Completed),
            _ => None,
        }
    }
}

/// A single match between two players. Scores are `None` until it is played.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub round: Round,
    pub status: MatchStatus,
}

impl GameMatch {
    pub fn from_row(row: &Row) -> Result<Self, DbError> {
        let round = row.get_str("round")?;
        let status = row.get_str("status")?;
        Ok(Self {
            id: row.get_i64("id")?,
            tournament_id: row.get_i64("tournament_id")?,
            player1_id: row.get_i64("player1_id")?,
            player2_id: row.get_i64("player2_id")?,
            score1: score_column(row, "score1")?,
            score2: score_column(row, "score2")?,
            round: Round::parse(round).ok_or_else(|| DbError::InvalidValue {
                column: "round".to_owned(),
                value: round.to_owned(),
            })?,
            status: MatchStatus::parse(status).ok_or_else(|| DbError::InvalidValue {
                column: "status".to_owned(),
                value: status.to_owned(),
            })?,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn participants(&self) -> (PlayerId, PlayerId) {
        (self.player1_id, self.player2_id)
    }

    /// Winner of a completed match: player1 only on a strictly higher score.
    pub fn winner(&self) -> Option<PlayerId> {
        match (self.status, self.score1, self.score2) {
            (MatchStatus::Completed, Some(s1), Some(s2)) => {
                Some(if s1 > s2 { self.player1_id } else { self.player2_id })
            }
            _ => None,
        }
    }

    /// The other side of [`GameMatch::winner`].
    pub fn loser(&self) -> Option<PlayerId> {
        self.winner().map(|w| {
            if w == self.player1_id {
                self.player2_id
            } else {
                self.player1_id
            }
        })
    }
}

fn score_column(row: &Row, column: &str) -> Result<Option<u32>, DbError> {
    row.get_opt_i64(column)?
        .map(|v| {
            u32::try_from(v).map_err(|_| DbError::InvalidValue {
                column: column.to_owned(),
                value: v.to_string(),
            })
        })
        .transpose()
}
