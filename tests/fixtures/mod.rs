//! Test fixtures and mock implementations for integration testing

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use pingpong_ladder::error::Result;
use pingpong_ladder::metrics::MetricsCollector;
use pingpong_ladder::rating::{RatingCalculator, RatingUpdate};
use pingpong_ladder::storage::{InMemoryStorage, LadderStorage};
use pingpong_ladder::types::{
    MatchInput, MatchRecord, MatchRequest, NewMatchRecord, Player, PlayerId, PlayerUpdate, Rating,
    SetScore,
};
use pingpong_ladder::LadderService;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Rating calculator that moves both players by a fixed number of points
/// and records every update it was asked for
#[derive(Debug)]
pub struct FixedDeltaCalculator {
    delta: Rating,
    initial_rating: Rating,
    calls: Mutex<Vec<(Rating, Rating)>>,
}

impl FixedDeltaCalculator {
    pub fn new(delta: Rating) -> Self {
        Self {
            delta,
            initial_rating: 1000,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(winner, loser)` ratings of every update so far
    pub fn calls(&self) -> Vec<(Rating, Rating)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl RatingCalculator for FixedDeltaCalculator {
    fn rating_update(&self, winner_rating: Rating, loser_rating: Rating) -> RatingUpdate {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((winner_rating, loser_rating));
        }

        RatingUpdate {
            winner_new: winner_rating + self.delta,
            loser_new: loser_rating - self.delta,
        }
    }

    fn initial_rating(&self) -> Rating {
        self.initial_rating
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({ "delta": self.delta, "initial_rating": self.initial_rating })
    }

    fn update_config(&mut self, _config: serde_json::Value) -> Result<()> {
        Ok(())
    }
}

/// Storage that delegates to memory but can be told to fail match writes
#[derive(Debug, Default)]
pub struct FlakyStorage {
    inner: InMemoryStorage,
    fail_matches: AtomicBool,
    failed_writes: AtomicUsize,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_match_writes(&self, fail: bool) {
        self.fail_matches.store(fail, Ordering::SeqCst);
    }

    pub fn failed_writes(&self) -> usize {
        self.failed_writes.load(Ordering::SeqCst)
    }
}

impl LadderStorage for FlakyStorage {
    fn get_player(&self, player_id: PlayerId) -> Result<Option<Player>> {
        self.inner.get_player(player_id)
    }

    fn find_player_by_name(&self, name: &str) -> Result<Option<Player>> {
        self.inner.find_player_by_name(name)
    }

    fn list_players(&self) -> Result<Vec<Player>> {
        self.inner.list_players()
    }

    fn insert_player(
        &self,
        name: &str,
        rating: Rating,
        created_at: DateTime<Utc>,
    ) -> Result<Player> {
        self.inner.insert_player(name, rating, created_at)
    }

    fn apply_match(
        &self,
        record: NewMatchRecord,
        updates: [PlayerUpdate; 2],
    ) -> Result<MatchRecord> {
        if self.fail_matches.load(Ordering::SeqCst) {
            self.failed_writes.fetch_add(1, Ordering::SeqCst);
            return Err(anyhow::anyhow!("simulated write failure"));
        }
        self.inner.apply_match(record, updates)
    }

    fn list_matches(&self) -> Result<Vec<MatchRecord>> {
        self.inner.list_matches()
    }

    fn player_count(&self) -> Result<usize> {
        self.inner.player_count()
    }

    fn match_count(&self) -> Result<usize> {
        self.inner.match_count()
    }
}

/// Ladder service over the given storage and calculator
pub fn create_service(
    storage: Arc<dyn LadderStorage>,
    calculator: Arc<dyn RatingCalculator>,
) -> LadderService {
    LadderService::new(
        storage,
        calculator,
        Arc::new(MetricsCollector::new().expect("Failed to create collector")),
    )
}

pub fn per_set(
    player1_id: PlayerId,
    player2_id: PlayerId,
    match_format: u32,
    sets: &[(i64, i64)],
) -> MatchRequest {
    MatchRequest {
        player1_id,
        player2_id,
        match_format,
        input: MatchInput::PerSetScores {
            set_scores: sets.iter().map(|&(a, b)| SetScore::new(a, b)).collect(),
        },
    }
}

pub fn counts(
    player1_id: PlayerId,
    player2_id: PlayerId,
    match_format: u32,
    sets_won1: i64,
    sets_won2: i64,
) -> MatchRequest {
    MatchRequest {
        player1_id,
        player2_id,
        match_format,
        input: MatchInput::AggregateCounts {
            sets_won1,
            sets_won2,
        },
    }
}

/// Unique path in the system temp directory; the file is not created
pub fn scratch_file(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();

    std::env::temp_dir().join(format!(
        "pingpong-ladder-{}-{}-{}.json",
        name,
        std::process::id(),
        nanos
    ))
}
