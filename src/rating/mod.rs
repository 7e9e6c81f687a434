//! Rating system integration using the Elo algorithm
//!
//! This module provides the pure Elo rating update and the calculator
//! trait the registration service depends on.

pub mod calculator;
pub mod elo;

// Re-export commonly used types
pub use calculator::{RatingCalculator, RatingUpdate};
pub use elo::{compute_rating_update, expected_scores, EloRatingCalculator};
