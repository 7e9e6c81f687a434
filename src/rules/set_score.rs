//! Single-set rules: legality of a point tally and who took the set

use crate::rules::violation::RuleViolation;
use crate::types::{SetScore, Side};

/// Points the set winner needs at minimum
pub const MIN_WINNING_POINTS: i64 = 11;

/// Required lead over the set loser
pub const MIN_WINNING_MARGIN: i64 = 2;

/// Validate a set's point tally.
///
/// Checks run in a fixed order and the first failure is returned:
/// negative points, a tie, a winner below 11 points, a margin below 2.
/// Integer-ness is guaranteed by the argument types; raw text goes through
/// [`parse_score`] first.
pub fn validate_set_score(score1: i64, score2: i64) -> Result<(), RuleViolation> {
    if score1 < 0 || score2 < 0 {
        return Err(RuleViolation::NegativeScore);
    }

    if score1 == score2 {
        return Err(RuleViolation::TiedSet);
    }

    let winner_score = score1.max(score2);
    let loser_score = score1.min(score2);

    if winner_score < MIN_WINNING_POINTS {
        return Err(RuleViolation::InsufficientPoints);
    }

    if winner_score - loser_score < MIN_WINNING_MARGIN {
        return Err(RuleViolation::InsufficientMargin);
    }

    Ok(())
}

/// Side with the higher score, `None` on equal scores.
///
/// Does not assume the scores form a legal set.
pub fn get_set_winner(score1: i64, score2: i64) -> Option<Side> {
    match score1.cmp(&score2) {
        std::cmp::Ordering::Greater => Some(Side::Player1),
        std::cmp::Ordering::Less => Some(Side::Player2),
        std::cmp::Ordering::Equal => None,
    }
}

/// Parse a user-entered score; anything that is not a whole number fails
/// with [`RuleViolation::NonIntegerScore`].
pub fn parse_score(raw: &str) -> Result<i64, RuleViolation> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| RuleViolation::NonIntegerScore)
}

/// Parse a set written as `"11-9"` (also accepts `:` as separator).
pub fn parse_set_score(raw: &str) -> Result<SetScore, RuleViolation> {
    let (left, right) = raw
        .split_once(|c: char| c == '-' || c == ':')
        .ok_or(RuleViolation::NonIntegerScore)?;

    Ok(SetScore::new(parse_score(left)?, parse_score(right)?))
}

impl SetScore {
    /// Validate this set, see [`validate_set_score`]
    pub fn validate(&self) -> Result<(), RuleViolation> {
        validate_set_score(self.score1, self.score2)
    }

    /// Winner of this set, see [`get_set_winner`]
    pub fn winner(&self) -> Option<Side> {
        get_set_winner(self.score1, self.score2)
    }
}
