//! Elo rating system implementation
//!
//! This module provides the ladder's rating engine on top of the Elo
//! implementation from the skillratings crate. Ratings are whole numbers;
//! the fractional Elo result is rounded half-up.

use crate::config::RatingConfig;
use crate::error::LadderError;
use crate::rating::calculator::{RatingCalculator, RatingUpdate};
use crate::types::Rating;
use skillratings::elo::{elo, expected_score, EloConfig, EloRating};
use skillratings::Outcomes;
use tracing::debug;

/// Compute new ratings for the winner and loser of a match.
///
/// Standard Elo: the winner scores 1, the loser 0, and each rating moves by
/// `k_factor * (score - expected)`. Pure and deterministic; ratings are not
/// range-checked.
pub fn compute_rating_update(
    winner_rating: Rating,
    loser_rating: Rating,
    k_factor: i64,
) -> RatingUpdate {
    let (winner, loser) = elo(
        &EloRating {
            rating: winner_rating as f64,
        },
        &EloRating {
            rating: loser_rating as f64,
        },
        &Outcomes::WIN,
        &EloConfig { k: k_factor as f64 },
    );

    RatingUpdate {
        winner_new: round_half_up(winner.rating),
        loser_new: round_half_up(loser.rating),
    }
}

/// Expected scores `(first, second)` of two ratings against each other
pub fn expected_scores(first: Rating, second: Rating) -> (f64, f64) {
    expected_score(
        &EloRating {
            rating: first as f64,
        },
        &EloRating {
            rating: second as f64,
        },
    )
}

/// Round to the nearest integer, halves towards positive infinity
fn round_half_up(value: f64) -> Rating {
    (value + 0.5).floor() as Rating
}

/// Elo rating calculator used by the registration service
#[derive(Debug)]
pub struct EloRatingCalculator {
    config: RatingConfig,
}

impl EloRatingCalculator {
    /// Create a new Elo rating calculator
    pub fn new(config: RatingConfig) -> crate::error::Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn k_factor(&self) -> i64 {
        self.config.k_factor
    }
}

impl Default for EloRatingCalculator {
    fn default() -> Self {
        Self {
            config: RatingConfig::default(),
        }
    }
}

impl RatingCalculator for EloRatingCalculator {
    fn rating_update(&self, winner_rating: Rating, loser_rating: Rating) -> RatingUpdate {
        let update = compute_rating_update(winner_rating, loser_rating, self.config.k_factor);

        debug!(
            "Elo update: winner {} -> {}, loser {} -> {} (k={})",
            winner_rating, update.winner_new, loser_rating, update.loser_new, self.config.k_factor
        );

        update
    }

    fn initial_rating(&self) -> Rating {
        self.config.initial_rating
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }

    fn update_config(&mut self, config: serde_json::Value) -> crate::error::Result<()> {
        let new_config: RatingConfig =
            serde_json::from_value(config).map_err(|e| LadderError::ConfigurationError {
                message: format!("Invalid Elo configuration: {}", e),
            })?;

        new_config.validate()?;
        self.config = new_config;
        Ok(())
    }
}
