//! Player registry and match registration
//!
//! [`LadderService`] is the boundary between callers and the pure rules and
//! rating code: it validates requests, loads players, computes new ratings
//! and persists the result. Rating read-modify-write is serialized by a
//! registration lock so concurrent registrations cannot lose updates.

use crate::error::LadderError;
use crate::metrics::MetricsCollector;
use crate::rating::RatingCalculator;
use crate::rules::validate_match_input;
use crate::stats::{summarize_matches, PlayerProfile};
use crate::storage::LadderStorage;
use crate::types::{
    MatchFormat, MatchInput, MatchOutcome, MatchRequest, MatchSummary, NewMatchRecord, Player,
    PlayerId, PlayerUpdate, Side,
};
use crate::utils::current_timestamp;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Result type for service operations
pub type ServiceResult<T> = std::result::Result<T, LadderError>;

/// Default number of matches in the recent matches listing
pub const DEFAULT_RECENT_MATCHES_LIMIT: usize = 10;

/// Ladder size, for health reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderStats {
    pub players: usize,
    pub matches: usize,
}

/// Match registration service
pub struct LadderService {
    storage: Arc<dyn LadderStorage>,
    calculator: Arc<dyn RatingCalculator>,
    metrics: Arc<MetricsCollector>,
    recent_matches_limit: usize,
    registration_lock: Mutex<()>,
}

impl LadderService {
    /// Create a new ladder service
    pub fn new(
        storage: Arc<dyn LadderStorage>,
        calculator: Arc<dyn RatingCalculator>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            storage,
            calculator,
            metrics,
            recent_matches_limit: DEFAULT_RECENT_MATCHES_LIMIT,
            registration_lock: Mutex::new(()),
        }
    }

    /// Set how many matches [`Self::recent_matches`] returns
    pub fn with_recent_matches_limit(mut self, limit: usize) -> Self {
        self.recent_matches_limit = limit;
        self
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Register a new player at the initial rating
    pub fn register_player(&self, name: &str) -> ServiceResult<Player> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LadderError::EmptyPlayerName);
        }

        let _guard = self.lock_registrations()?;

        let player = self
            .storage
            .insert_player(name, self.calculator.initial_rating(), current_timestamp())
            .map_err(into_ladder_error)?;

        self.metrics.record_player_registered();
        info!(
            "Registered player '{}' (id {}) at rating {}",
            player.name, player.id, player.rating
        );

        Ok(player)
    }

    /// Get a player by id
    pub fn get_player(&self, player_id: PlayerId) -> ServiceResult<Player> {
        self.storage
            .get_player(player_id)
            .map_err(into_ladder_error)?
            .ok_or(LadderError::PlayerNotFound { player_id })
    }

    /// All players, highest rating first
    pub fn leaderboard(&self) -> ServiceResult<Vec<Player>> {
        let mut players = self.storage.list_players().map_err(into_ladder_error)?;
        players.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| a.name.cmp(&b.name)));
        Ok(players)
    }

    /// All players in name order
    pub fn players_by_name(&self) -> ServiceResult<Vec<Player>> {
        let mut players = self.storage.list_players().map_err(into_ladder_error)?;
        players.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(players)
    }

    /// Register a played match and update both players' ratings
    pub fn register_match(&self, request: MatchRequest) -> ServiceResult<MatchOutcome> {
        let timer = self.metrics.start_timer();

        match self.apply_match(&request) {
            Ok((outcome, format)) => {
                self.metrics.record_match_registered(
                    format,
                    &request.input,
                    match outcome.winner {
                        Side::Player1 => outcome.player1_rating_change,
                        Side::Player2 => outcome.player2_rating_change,
                    },
                    timer.stop(),
                );
                Ok(outcome)
            }
            Err(e) => {
                warn!(
                    "Match registration rejected - players: {} vs {}, format: {}, error: {}",
                    request.player1_id, request.player2_id, request.match_format, e
                );
                self.metrics.record_match_rejected(rejection_reason(&e));
                Err(e)
            }
        }
    }

    fn apply_match(&self, request: &MatchRequest) -> ServiceResult<(MatchOutcome, MatchFormat)> {
        if request.player1_id == request.player2_id {
            return Err(LadderError::SamePlayer);
        }

        let tally = validate_match_input(request.match_format, &request.input)?;
        let format = MatchFormat::try_from(request.match_format)?;
        let winner = tally.winner().ok_or_else(|| LadderError::InternalError {
            message: "validated match has no winner".to_string(),
        })?;

        let _guard = self.lock_registrations()?;

        let player1 = self.get_player(request.player1_id)?;
        let player2 = self.get_player(request.player2_id)?;

        let (player1_after, player2_after) = match winner {
            Side::Player1 => {
                let update = self.calculator.rating_update(player1.rating, player2.rating);
                (update.winner_new, update.loser_new)
            }
            Side::Player2 => {
                let update = self.calculator.rating_update(player2.rating, player1.rating);
                (update.loser_new, update.winner_new)
            }
        };

        let set_scores = match &request.input {
            MatchInput::PerSetScores { set_scores } => Some(set_scores.clone()),
            MatchInput::AggregateCounts { .. } => None,
        };

        let record = NewMatchRecord {
            player1_id: player1.id,
            player2_id: player2.id,
            format,
            tally,
            set_scores,
            player1_rating_before: player1.rating,
            player2_rating_before: player2.rating,
            player1_rating_after: player1_after,
            player2_rating_after: player2_after,
            played_at: current_timestamp(),
        };

        let stored = self
            .storage
            .apply_match(
                record,
                [
                    PlayerUpdate {
                        player_id: player1.id,
                        rating: player1_after,
                        won: winner == Side::Player1,
                    },
                    PlayerUpdate {
                        player_id: player2.id,
                        rating: player2_after,
                        won: winner == Side::Player2,
                    },
                ],
            )
            .map_err(into_ladder_error)?;

        let outcome = MatchOutcome {
            match_id: stored.id,
            winner,
            sets_won1: stored.sets_won1,
            sets_won2: stored.sets_won2,
            player1_rating_change: player1_after - player1.rating,
            player2_rating_change: player2_after - player2.rating,
        };

        info!(
            "Registered match {} ({}): '{}' {}-{} '{}', ratings {} -> {} and {} -> {}",
            stored.id,
            format,
            player1.name,
            stored.sets_won1,
            stored.sets_won2,
            player2.name,
            player1.rating,
            player1_after,
            player2.rating,
            player2_after
        );

        Ok((outcome, format))
    }

    /// Latest matches with player names, newest first
    pub fn recent_matches(&self) -> ServiceResult<Vec<MatchSummary>> {
        let mut summaries = self.all_match_summaries()?;
        summaries.truncate(self.recent_matches_limit);
        Ok(summaries)
    }

    /// Every match of one player, newest first
    pub fn player_matches(&self, player_id: PlayerId) -> ServiceResult<Vec<MatchSummary>> {
        self.get_player(player_id)?;

        let summaries = self
            .all_match_summaries()?
            .into_iter()
            .filter(|summary| summary.record.involves(player_id))
            .collect();
        Ok(summaries)
    }

    /// Player with win rate, match history and nemesis
    pub fn player_profile(&self, player_id: PlayerId) -> ServiceResult<PlayerProfile> {
        let player = self.get_player(player_id)?;
        let matches = self.player_matches(player_id)?;

        debug!(
            "Building profile for player {} from {} matches",
            player_id,
            matches.len()
        );

        Ok(PlayerProfile::build(player, &matches))
    }

    /// Current ladder size
    pub fn stats(&self) -> ServiceResult<LadderStats> {
        Ok(LadderStats {
            players: self.storage.player_count().map_err(into_ladder_error)?,
            matches: self.storage.match_count().map_err(into_ladder_error)?,
        })
    }

    fn all_match_summaries(&self) -> ServiceResult<Vec<MatchSummary>> {
        let players = self.storage.list_players().map_err(into_ladder_error)?;
        let records = self.storage.list_matches().map_err(into_ladder_error)?;
        Ok(summarize_matches(records, &players))
    }

    fn lock_registrations(&self) -> ServiceResult<std::sync::MutexGuard<'_, ()>> {
        self.registration_lock
            .lock()
            .map_err(|_| LadderError::InternalError {
                message: "Failed to acquire registration lock".to_string(),
            })
    }
}

/// Recover a typed error from storage, wrapping anything else
fn into_ladder_error(error: anyhow::Error) -> LadderError {
    match error.downcast::<LadderError>() {
        Ok(ladder_error) => ladder_error,
        Err(other) => LadderError::StorageError {
            message: format!("{:#}", other),
        },
    }
}

/// Metrics label for a failed registration
fn rejection_reason(error: &LadderError) -> &'static str {
    match error {
        LadderError::InvalidMatch(violation) => violation.code(),
        LadderError::SamePlayer => "same_player",
        LadderError::PlayerNotFound { .. } => "player_not_found",
        LadderError::MissingSetResult => "missing_set_result",
        LadderError::StorageError { .. } => "storage_error",
        _ => "internal_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::EloRatingCalculator;
    use crate::rules::RuleViolation;
    use crate::storage::{InMemoryStorage, MockLadderStorage};
    use crate::types::SetScore;
    use chrono::Utc;

    fn create_service() -> LadderService {
        LadderService::new(
            Arc::new(InMemoryStorage::new()),
            Arc::new(EloRatingCalculator::default()),
            Arc::new(MetricsCollector::new().unwrap()),
        )
    }

    fn per_set(
        player1_id: PlayerId,
        player2_id: PlayerId,
        format: u32,
        sets: &[(i64, i64)],
    ) -> MatchRequest {
        MatchRequest {
            player1_id,
            player2_id,
            match_format: format,
            input: MatchInput::PerSetScores {
                set_scores: sets.iter().map(|&(a, b)| SetScore::new(a, b)).collect(),
            },
        }
    }

    #[test]
    fn test_register_player() {
        let service = create_service();
        let player = service.register_player("  Alice ").unwrap();

        assert_eq!(player.name, "Alice");
        assert_eq!(player.rating, 1500);
        assert_eq!(player.games_played(), 0);
    }

    #[test]
    fn test_register_player_validation() {
        let service = create_service();
        service.register_player("Alice").unwrap();

        assert!(matches!(
            service.register_player("   "),
            Err(LadderError::EmptyPlayerName)
        ));
        assert!(matches!(
            service.register_player("Alice "),
            Err(LadderError::DuplicatePlayerName { .. })
        ));
    }

    #[test]
    fn test_register_match_updates_ratings() {
        let service = create_service();
        let alice = service.register_player("Alice").unwrap();
        let bob = service.register_player("Bob").unwrap();

        let outcome = service
            .register_match(per_set(alice.id, bob.id, 3, &[(11, 5), (9, 11), (11, 7)]))
            .unwrap();

        assert_eq!(outcome.winner, Side::Player1);
        assert_eq!((outcome.sets_won1, outcome.sets_won2), (2, 1));
        assert_eq!(outcome.player1_rating_change, 16);
        assert_eq!(outcome.player2_rating_change, -16);

        let alice = service.get_player(alice.id).unwrap();
        let bob = service.get_player(bob.id).unwrap();
        assert_eq!((alice.rating, alice.wins, alice.losses), (1516, 1, 0));
        assert_eq!((bob.rating, bob.wins, bob.losses), (1484, 0, 1));
    }

    #[test]
    fn test_player2_win_orders_ratings() {
        let service = create_service();
        let alice = service.register_player("Alice").unwrap();
        let bob = service.register_player("Bob").unwrap();

        let outcome = service
            .register_match(MatchRequest {
                player1_id: alice.id,
                player2_id: bob.id,
                match_format: 5,
                input: MatchInput::AggregateCounts {
                    sets_won1: 1,
                    sets_won2: 3,
                },
            })
            .unwrap();

        assert_eq!(outcome.winner, Side::Player2);
        assert_eq!(outcome.player2_rating_change, 16);

        let recent = service.recent_matches().unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].record.set_scores, None);
        assert_eq!(recent[0].player2_name, "Bob");
    }

    #[test]
    fn test_same_player_rejected() {
        let service = create_service();
        let alice = service.register_player("Alice").unwrap();

        let result = service.register_match(per_set(alice.id, alice.id, 1, &[(11, 3)]));
        assert!(matches!(result, Err(LadderError::SamePlayer)));
    }

    #[test]
    fn test_invalid_match_leaves_ratings_untouched() {
        let service = create_service();
        let alice = service.register_player("Alice").unwrap();
        let bob = service.register_player("Bob").unwrap();

        let result =
            service.register_match(per_set(alice.id, bob.id, 3, &[(11, 5), (11, 7), (11, 2)]));
        assert!(matches!(
            result,
            Err(LadderError::InvalidMatch(RuleViolation::MatchContinuedAfterWin))
        ));

        assert_eq!(service.get_player(alice.id).unwrap().rating, 1500);
        assert_eq!(service.stats().unwrap().matches, 0);
        assert_eq!(
            service
                .metrics()
                .ladder()
                .match_rejections_total
                .with_label_values(&["match_continued_after_win"])
                .get(),
            1
        );
    }

    #[test]
    fn test_unknown_player() {
        let service = create_service();
        let alice = service.register_player("Alice").unwrap();

        let result = service.register_match(per_set(alice.id, 99, 1, &[(11, 3)]));
        assert!(matches!(
            result,
            Err(LadderError::PlayerNotFound { player_id: 99 })
        ));
    }

    #[test]
    fn test_leaderboard_and_name_order() {
        let service = create_service();
        let carl = service.register_player("carl").unwrap();
        let alice = service.register_player("Alice").unwrap();
        service.register_player("Bob").unwrap();

        service
            .register_match(per_set(carl.id, alice.id, 1, &[(11, 4)]))
            .unwrap();

        let leaderboard = service.leaderboard().unwrap();
        let names: Vec<_> = leaderboard.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["carl", "Bob", "Alice"]);

        let by_name = service.players_by_name().unwrap();
        let names: Vec<_> = by_name.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "carl"]);
    }

    #[test]
    fn test_recent_matches_limit() {
        let service = create_service().with_recent_matches_limit(2);
        let alice = service.register_player("Alice").unwrap();
        let bob = service.register_player("Bob").unwrap();

        for _ in 0..3 {
            service
                .register_match(per_set(alice.id, bob.id, 1, &[(11, 9)]))
                .unwrap();
        }

        let recent = service.recent_matches().unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].record.id > recent[1].record.id);
    }

    #[test]
    fn test_player_profile() {
        let service = create_service();
        let alice = service.register_player("Alice").unwrap();
        let bob = service.register_player("Bob").unwrap();
        let carl = service.register_player("Carl").unwrap();

        for _ in 0..3 {
            service
                .register_match(per_set(alice.id, bob.id, 1, &[(5, 11)]))
                .unwrap();
        }
        service
            .register_match(per_set(alice.id, carl.id, 1, &[(11, 5)]))
            .unwrap();

        let profile = service.player_profile(alice.id).unwrap();
        assert_eq!(profile.games_played, 4);
        assert_eq!(profile.win_rate, 25.0);
        assert_eq!(profile.matches.len(), 4);
        assert_eq!(profile.nemesis.unwrap().opponent_id, bob.id);

        assert!(matches!(
            service.player_profile(42),
            Err(LadderError::PlayerNotFound { .. })
        ));
    }

    #[test]
    fn test_storage_failure_is_reported() {
        let mut storage = MockLadderStorage::new();
        storage.expect_get_player().returning(|player_id| {
            Ok(Some(Player {
                id: player_id,
                name: format!("player{}", player_id),
                rating: 1500,
                wins: 0,
                losses: 0,
                created_at: Utc::now(),
            }))
        });
        storage
            .expect_apply_match()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("disk full")));

        let service = LadderService::new(
            Arc::new(storage),
            Arc::new(EloRatingCalculator::default()),
            Arc::new(MetricsCollector::new().unwrap()),
        );

        let result = service.register_match(per_set(1, 2, 1, &[(11, 7)]));
        match result {
            Err(LadderError::StorageError { message }) => assert!(message.contains("disk full")),
            other => panic!("expected storage error, got {:?}", other),
        }
    }
}
