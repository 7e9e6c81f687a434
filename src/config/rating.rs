//! Rating system configuration

use crate::error::LadderError;
use crate::types::Rating;
use serde::{Deserialize, Serialize};

/// Default K-factor (sensitivity of a single match)
pub const DEFAULT_K_FACTOR: i64 = 32;

/// Rating given to newly registered players
pub const DEFAULT_INITIAL_RATING: Rating = 1500;

/// Elo parameters for a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Fixed K-factor, the same for every player and match
    pub k_factor: i64,
    pub initial_rating: Rating,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            k_factor: DEFAULT_K_FACTOR,
            initial_rating: DEFAULT_INITIAL_RATING,
        }
    }
}

impl RatingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.k_factor <= 0 {
            return Err(LadderError::ConfigurationError {
                message: "K-factor must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
