//! Ping-pong match rules
//!
//! Pure validation of set scores and match results for best-of-1/3/5
//! formats, plus set and match winner derivation. Nothing here keeps state
//! or performs I/O.

pub mod match_validator;
pub mod set_score;
pub mod violation;

// Re-export commonly used items
pub use match_validator::{
    get_match_winner, validate_match, validate_match_input, validate_set_counts,
};
pub use set_score::{get_set_winner, parse_score, parse_set_score, validate_set_score};
pub use violation::{Locale, RuleViolation};
