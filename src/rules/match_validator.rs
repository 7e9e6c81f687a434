//! Whole-match rules for best-of-1/3/5 formats
//!
//! A match can be reported either set by set or as a final set count; both
//! encodings arrive as a [`MatchInput`] and are validated through
//! [`validate_match_input`].

use crate::rules::violation::RuleViolation;
use crate::types::{MatchFormat, MatchInput, SetScore, SetTally, Side};

/// Validate a match reported set by set and return the sets won per side.
///
/// The match is decided the moment one side reaches `sets_to_win`; any set
/// listed after that point is rejected.
pub fn validate_match(format: u32, set_scores: &[SetScore]) -> Result<SetTally, RuleViolation> {
    let format = MatchFormat::try_from(format)?;

    if set_scores.is_empty() {
        return Err(RuleViolation::NoSetsRecorded);
    }

    let sets_to_win = format.sets_to_win();
    let mut tally = SetTally {
        sets_won1: 0,
        sets_won2: 0,
    };

    for (index, set) in set_scores.iter().enumerate() {
        if tally.sets_won1 == sets_to_win || tally.sets_won2 == sets_to_win {
            return Err(RuleViolation::MatchContinuedAfterWin);
        }

        set.validate().map_err(|reason| RuleViolation::InvalidSet {
            set: index + 1,
            reason: Box::new(reason),
        })?;

        match set.winner() {
            Some(Side::Player1) => tally.sets_won1 += 1,
            Some(Side::Player2) => tally.sets_won2 += 1,
            None => {}
        }
    }

    let player1_done = tally.sets_won1 == sets_to_win;
    let player2_done = tally.sets_won2 == sets_to_win;
    if player1_done == player2_done {
        return Err(RuleViolation::NoWinnerYet { sets_to_win });
    }

    Ok(tally)
}

/// Side that took more sets, `None` when the sets are split evenly.
///
/// Counts sets with [`crate::rules::get_set_winner`] and does not validate.
pub fn get_match_winner(set_scores: &[SetScore]) -> Option<Side> {
    let tally = set_scores
        .iter()
        .fold(SetTally { sets_won1: 0, sets_won2: 0 }, |mut tally, set| {
            match set.winner() {
                Some(Side::Player1) => tally.sets_won1 += 1,
                Some(Side::Player2) => tally.sets_won2 += 1,
                None => {}
            }
            tally
        });

    tally.winner()
}

/// Validate a match reported only as final set counts, e.g. "2-1" in a Bo3.
pub fn validate_set_counts(
    format: u32,
    sets_won1: i64,
    sets_won2: i64,
) -> Result<SetTally, RuleViolation> {
    let format = MatchFormat::try_from(format)?;

    if sets_won1 < 0 || sets_won2 < 0 {
        return Err(RuleViolation::NegativeSetCount);
    }

    let sets_to_win = format.sets_to_win() as i64;
    let player1_done = sets_won1 == sets_to_win;
    let player2_done = sets_won2 == sets_to_win;

    if player1_done && player2_done {
        return Err(RuleViolation::BothReachedSetsToWin {
            sets_to_win: format.sets_to_win(),
        });
    }

    if !player1_done && !player2_done {
        if sets_won1 > sets_to_win || sets_won2 > sets_to_win {
            return Err(RuleViolation::SetCountExceedsSetsToWin {
                sets_to_win: format.sets_to_win(),
            });
        }
        return Err(RuleViolation::NoWinnerYet {
            sets_to_win: format.sets_to_win(),
        });
    }

    let loser_sets = if player1_done { sets_won2 } else { sets_won1 };
    if loser_sets >= sets_to_win {
        return Err(RuleViolation::SetCountExceedsSetsToWin {
            sets_to_win: format.sets_to_win(),
        });
    }

    let total = sets_won1 + sets_won2;
    if total > format.max_sets() as i64 {
        return Err(RuleViolation::TooManySets {
            total: total as u32,
            max_sets: format.max_sets(),
        });
    }

    Ok(SetTally {
        sets_won1: sets_won1 as u32,
        sets_won2: sets_won2 as u32,
    })
}

/// Validate either encoding of a match result
pub fn validate_match_input(format: u32, input: &MatchInput) -> Result<SetTally, RuleViolation> {
    match input {
        MatchInput::PerSetScores { set_scores } => validate_match(format, set_scores),
        MatchInput::AggregateCounts {
            sets_won1,
            sets_won2,
        } => validate_set_counts(format, *sets_won1, *sets_won2),
    }
}
