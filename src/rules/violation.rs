//! Rule violations reported by the match validator
//!
//! Every check in [`crate::rules`] reports its failure as a [`RuleViolation`].
//! The `Display` text is English; [`RuleViolation::localized`] renders the
//! same violation for another [`Locale`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Language used for user-facing rule messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Sv,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "sv" | "swedish" | "svenska" => Ok(Locale::Sv),
            other => Err(format!("Unsupported locale: {}", other)),
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Sv => write!(f, "sv"),
        }
    }
}

/// A broken ping-pong rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("scores must be integers")]
    NonIntegerScore,

    #[error("scores cannot be negative")]
    NegativeScore,

    #[error("a set cannot end in a tie")]
    TiedSet,

    #[error("winner must have at least 11 points")]
    InsufficientPoints,

    #[error("winner must win by at least 2 points")]
    InsufficientMargin,

    #[error("invalid match format {format}: must be best of 1, 3 or 5")]
    InvalidFormat { format: u32 },

    #[error("no sets recorded")]
    NoSetsRecorded,

    #[error("Set {set}: {reason}")]
    InvalidSet {
        set: usize,
        reason: Box<RuleViolation>,
    },

    #[error("match continued after a player already won")]
    MatchContinuedAfterWin,

    #[error("no player has won {sets_to_win} sets yet")]
    NoWinnerYet { sets_to_win: u32 },

    #[error("set counts must be integers")]
    NonIntegerSetCount,

    #[error("set counts cannot be negative")]
    NegativeSetCount,

    #[error("both players cannot win {sets_to_win} sets")]
    BothReachedSetsToWin { sets_to_win: u32 },

    #[error("a player cannot win more than {sets_to_win} sets")]
    SetCountExceedsSetsToWin { sets_to_win: u32 },

    #[error("{total} sets played exceeds best of {max_sets}")]
    TooManySets { total: u32, max_sets: u32 },
}

impl RuleViolation {
    /// Render the violation for the given locale
    pub fn localized(&self, locale: Locale) -> String {
        match locale {
            Locale::En => self.to_string(),
            Locale::Sv => self.swedish(),
        }
    }

    /// Short machine-readable name, used as a metrics label
    pub fn code(&self) -> &'static str {
        match self {
            RuleViolation::NonIntegerScore => "non_integer_score",
            RuleViolation::NegativeScore => "negative_score",
            RuleViolation::TiedSet => "tied_set",
            RuleViolation::InsufficientPoints => "insufficient_points",
            RuleViolation::InsufficientMargin => "insufficient_margin",
            RuleViolation::InvalidFormat { .. } => "invalid_format",
            RuleViolation::NoSetsRecorded => "no_sets_recorded",
            RuleViolation::InvalidSet { .. } => "invalid_set",
            RuleViolation::MatchContinuedAfterWin => "match_continued_after_win",
            RuleViolation::NoWinnerYet { .. } => "no_winner_yet",
            RuleViolation::NonIntegerSetCount => "non_integer_set_count",
            RuleViolation::NegativeSetCount => "negative_set_count",
            RuleViolation::BothReachedSetsToWin { .. } => "both_reached_sets_to_win",
            RuleViolation::SetCountExceedsSetsToWin { .. } => "set_count_exceeds_sets_to_win",
            RuleViolation::TooManySets { .. } => "too_many_sets",
        }
    }

    fn swedish(&self) -> String {
        match self {
            RuleViolation::NonIntegerScore => "Poängen måste vara heltal".to_string(),
            RuleViolation::NegativeScore => "Poängen kan inte vara negativa".to_string(),
            RuleViolation::TiedSet => "Matchen kan inte sluta oavgjort".to_string(),
            RuleViolation::InsufficientPoints => "Vinnaren måste ha minst 11 poäng".to_string(),
            RuleViolation::InsufficientMargin => {
                "Vinnaren måste vinna med minst 2 poäng".to_string()
            }
            RuleViolation::InvalidFormat { format } => {
                format!("Ogiltigt matchformat {}: måste vara bäst av 1, 3 eller 5", format)
            }
            RuleViolation::NoSetsRecorded => "Inga set registrerade".to_string(),
            RuleViolation::InvalidSet { set, reason } => {
                format!("Set {}: {}", set, reason.swedish())
            }
            RuleViolation::MatchContinuedAfterWin => {
                "Matchen fortsatte efter att en spelare redan vunnit".to_string()
            }
            RuleViolation::NoWinnerYet { sets_to_win } => {
                format!("Ingen spelare har vunnit {} set än", sets_to_win)
            }
            RuleViolation::NonIntegerSetCount => "Antal vunna set måste vara heltal".to_string(),
            RuleViolation::NegativeSetCount => {
                "Antal vunna set kan inte vara negativt".to_string()
            }
            RuleViolation::BothReachedSetsToWin { sets_to_win } => {
                format!("Båda spelarna kan inte vinna {} set", sets_to_win)
            }
            RuleViolation::SetCountExceedsSetsToWin { sets_to_win } => {
                format!("En spelare kan inte vinna mer än {} set", sets_to_win)
            }
            RuleViolation::TooManySets { total, max_sets } => {
                format!("{} spelade set överstiger bäst av {}", total, max_sets)
            }
        }
    }
}
