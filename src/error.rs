//! Error types for the ladder service
//!
//! Rule checks report [`RuleViolation`]s; everything at the service boundary
//! is a [`LadderError`]. Plumbing code uses anyhow for consistent error
//! handling throughout the application.

use crate::rules::{Locale, RuleViolation};
use crate::types::PlayerId;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ladder scenarios
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: PlayerId },

    #[error("A player named '{name}' already exists")]
    DuplicatePlayerName { name: String },

    #[error("Player name is required")]
    EmptyPlayerName,

    #[error("Players must be different")]
    SamePlayer,

    #[error("Set result is required")]
    MissingSetResult,

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid match: {0}")]
    InvalidMatch(#[from] RuleViolation),

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl LadderError {
    /// User-facing message in the given locale
    pub fn localized(&self, locale: Locale) -> String {
        match (self, locale) {
            (LadderError::InvalidMatch(violation), locale) => violation.localized(locale),
            (LadderError::PlayerNotFound { .. }, Locale::Sv) => {
                "Spelaren hittades inte".to_string()
            }
            (LadderError::DuplicatePlayerName { .. }, Locale::Sv) => {
                "En spelare med detta namn finns redan".to_string()
            }
            (LadderError::EmptyPlayerName, Locale::Sv) => "Spelarnamn krävs".to_string(),
            (LadderError::SamePlayer, Locale::Sv) => "Spelarna måste vara olika".to_string(),
            (LadderError::MissingSetResult, Locale::Sv) => "Setresultat krävs".to_string(),
            (LadderError::InvalidRequest { .. }, Locale::Sv) => "Ogiltig förfrågan".to_string(),
            (error, _) => error.to_string(),
        }
    }

    /// True when the caller can fix the request and retry
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            LadderError::StorageError { .. }
                | LadderError::ConfigurationError { .. }
                | LadderError::InternalError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_violation_conversion() {
        let error: LadderError = RuleViolation::TiedSet.into();
        assert_eq!(error.to_string(), "Invalid match: a set cannot end in a tie");
        assert_eq!(error.localized(Locale::En), "a set cannot end in a tie");
        assert_eq!(
            error.localized(Locale::Sv),
            "Matchen kan inte sluta oavgjort"
        );
    }

    #[test]
    fn test_localized_service_errors() {
        assert_eq!(
            LadderError::SamePlayer.localized(Locale::Sv),
            "Spelarna måste vara olika"
        );
        assert_eq!(
            LadderError::PlayerNotFound { player_id: 7 }.localized(Locale::En),
            "Player not found: 7"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(LadderError::SamePlayer.is_client_error());
        assert!(LadderError::InvalidRequest {
            message: "missing field `name`".to_string()
        }
        .is_client_error());
        assert!(!LadderError::StorageError {
            message: "disk full".to_string()
        }
        .is_client_error());
    }
}
