//! Common types used throughout the ladder

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for players
pub type PlayerId = u64;

/// Unique identifier for recorded matches
pub type MatchId = u64;

/// Integer Elo rating
pub type Rating = i64;

/// One side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    /// The other side of the table
    pub fn opponent(self) -> Self {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Player1 => write!(f, "player1"),
            Side::Player2 => write!(f, "player2"),
        }
    }
}

/// Point tally of a single set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetScore {
    pub score1: i64,
    pub score2: i64,
}

impl SetScore {
    pub fn new(score1: i64, score2: i64) -> Self {
        Self { score1, score2 }
    }
}

impl std::fmt::Display for SetScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.score1, self.score2)
    }
}

/// Best-of-N match format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum MatchFormat {
    BestOf1,
    BestOf3,
    BestOf5,
}

impl MatchFormat {
    /// Number of sets in the longest possible match
    pub fn max_sets(self) -> u32 {
        match self {
            MatchFormat::BestOf1 => 1,
            MatchFormat::BestOf3 => 3,
            MatchFormat::BestOf5 => 5,
        }
    }

    /// Sets a side needs to take the match, `ceil(N / 2)`
    pub fn sets_to_win(self) -> u32 {
        self.max_sets().div_ceil(2)
    }
}

impl TryFrom<u32> for MatchFormat {
    type Error = crate::rules::RuleViolation;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MatchFormat::BestOf1),
            3 => Ok(MatchFormat::BestOf3),
            5 => Ok(MatchFormat::BestOf5),
            other => Err(crate::rules::RuleViolation::InvalidFormat { format: other }),
        }
    }
}

impl From<MatchFormat> for u32 {
    fn from(format: MatchFormat) -> Self {
        format.max_sets()
    }
}

impl std::fmt::Display for MatchFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bo{}", self.max_sets())
    }
}

/// How a match result was reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchInput {
    /// Point detail for every set played
    PerSetScores { set_scores: Vec<SetScore> },
    /// Only the final set count, e.g. "2-1"
    AggregateCounts { sets_won1: i64, sets_won2: i64 },
}

/// Sets won by each side in a validated match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTally {
    pub sets_won1: u32,
    pub sets_won2: u32,
}

impl SetTally {
    /// Side with more sets, `None` when level
    pub fn winner(&self) -> Option<Side> {
        match self.sets_won1.cmp(&self.sets_won2) {
            std::cmp::Ordering::Greater => Some(Side::Player1),
            std::cmp::Ordering::Less => Some(Side::Player2),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A registered player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub rating: Rating,
    pub wins: u32,
    pub losses: u32,
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn games_played(&self) -> u32 {
        self.wins + self.losses
    }
}

/// New rating and result counters for one player after a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerUpdate {
    pub player_id: PlayerId,
    pub rating: Rating,
    pub won: bool,
}

/// Persisted match result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub format: MatchFormat,
    pub sets_won1: u32,
    pub sets_won2: u32,
    /// Only present when the result was reported set by set
    pub set_scores: Option<Vec<SetScore>>,
    pub player1_rating_before: Rating,
    pub player2_rating_before: Rating,
    pub player1_rating_after: Rating,
    pub player2_rating_after: Rating,
    pub played_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn winner(&self) -> Option<Side> {
        SetTally {
            sets_won1: self.sets_won1,
            sets_won2: self.sets_won2,
        }
        .winner()
    }

    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }
}

/// Match record before storage assigns an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewMatchRecord {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub format: MatchFormat,
    pub tally: SetTally,
    pub set_scores: Option<Vec<SetScore>>,
    pub player1_rating_before: Rating,
    pub player2_rating_before: Rating,
    pub player1_rating_after: Rating,
    pub player2_rating_after: Rating,
    pub played_at: DateTime<Utc>,
}

/// Match record joined with both player names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    #[serde(flatten)]
    pub record: MatchRecord,
    pub player1_name: String,
    pub player2_name: String,
}

/// Request to register a played match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub match_format: u32,
    pub input: MatchInput,
}

/// Result of a successful match registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub match_id: MatchId,
    pub winner: Side,
    pub sets_won1: u32,
    pub sets_won2: u32,
    pub player1_rating_change: i64,
    pub player2_rating_change: i64,
}
