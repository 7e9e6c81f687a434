//! Rating calculator trait
//!
//! The registration service is written against [`RatingCalculator`] so the
//! rating parameters can be swapped at runtime and tests can pin results.

use crate::types::Rating;
use serde::{Deserialize, Serialize};

/// Ratings of both players after a decided match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub winner_new: Rating,
    pub loser_new: Rating,
}

impl RatingUpdate {
    /// Points gained by the winner
    pub fn winner_delta(&self, winner_before: Rating) -> i64 {
        self.winner_new - winner_before
    }

    /// Points lost by the loser (negative or zero)
    pub fn loser_delta(&self, loser_before: Rating) -> i64 {
        self.loser_new - loser_before
    }
}

/// Trait for calculating rating changes after a match
pub trait RatingCalculator: Send + Sync {
    /// New ratings for the winner and loser of a match
    ///
    /// The caller has already decided who won; there is no draw.
    fn rating_update(&self, winner_rating: Rating, loser_rating: Rating) -> RatingUpdate;

    /// Get the initial rating for new players
    fn initial_rating(&self) -> Rating;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;

    /// Update configuration from JSON
    fn update_config(&mut self, config: serde_json::Value) -> crate::error::Result<()>;
}
