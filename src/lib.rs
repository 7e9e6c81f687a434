//! Pingpong Ladder - match tracker for a table tennis ladder
//!
//! This crate validates reported table tennis matches against the scoring
//! rules, keeps player ratings with Elo, and serves the ladder over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod rating;
pub mod rules;
pub mod service;
pub mod stats;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LadderError, Result};
pub use types::*;

// Re-export key components
pub use rating::{compute_rating_update, EloRatingCalculator, RatingCalculator, RatingUpdate};
pub use rules::{
    get_match_winner, get_set_winner, validate_match, validate_match_input, validate_set_counts,
    validate_set_score, Locale, RuleViolation,
};
pub use service::LadderService;
pub use storage::{InMemoryStorage, JsonFileStorage, LadderStorage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
