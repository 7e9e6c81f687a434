//! Utility functions for the ladder service

use crate::types::Rating;
use chrono::{DateTime, Utc};

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Format a rating change with an explicit sign, e.g. `+16` or `-16`
pub fn format_rating_change(change: Rating) -> String {
    format!("{:+}", change)
}
