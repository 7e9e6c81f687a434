//! Ladder storage interface and implementations
//!
//! This module defines the interface for persisting players and match
//! records, with an in-memory implementation and a JSON snapshot file
//! implementation built on top of it.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStorage;
pub use memory::InMemoryStorage;

use crate::error::LadderError;
use crate::types::{
    MatchId, MatchRecord, NewMatchRecord, Player, PlayerId, PlayerUpdate, Rating,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trait for ladder storage operations
#[cfg_attr(test, mockall::automock)]
pub trait LadderStorage: Send + Sync {
    /// Get a player by id
    fn get_player(&self, player_id: PlayerId) -> crate::error::Result<Option<Player>>;

    /// Look up a player by exact name
    fn find_player_by_name(&self, name: &str) -> crate::error::Result<Option<Player>>;

    /// All registered players, in id order
    fn list_players(&self) -> crate::error::Result<Vec<Player>>;

    /// Register a new player; names are unique
    fn insert_player(
        &self,
        name: &str,
        rating: Rating,
        created_at: DateTime<Utc>,
    ) -> crate::error::Result<Player>;

    /// Store a match record and both player updates atomically
    fn apply_match(
        &self,
        record: NewMatchRecord,
        updates: [PlayerUpdate; 2],
    ) -> crate::error::Result<MatchRecord>;

    /// All match records, newest first
    fn list_matches(&self) -> crate::error::Result<Vec<MatchRecord>>;

    /// Get total number of registered players
    fn player_count(&self) -> crate::error::Result<usize>;

    /// Get total number of recorded matches
    fn match_count(&self) -> crate::error::Result<usize>;
}

/// Complete ladder contents, shared by the storage implementations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LadderState {
    players: BTreeMap<PlayerId, Player>,
    matches: Vec<MatchRecord>,
    next_player_id: PlayerId,
    next_match_id: MatchId,
}

impl LadderState {
    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.get(&player_id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.values().find(|player| player.name == name)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Add a player, rejecting duplicate names
    pub fn insert_player(
        &mut self,
        name: &str,
        rating: Rating,
        created_at: DateTime<Utc>,
    ) -> Result<Player, LadderError> {
        if self.player_by_name(name).is_some() {
            return Err(LadderError::DuplicatePlayerName {
                name: name.to_string(),
            });
        }

        self.next_player_id += 1;
        let player = Player {
            id: self.next_player_id,
            name: name.to_string(),
            rating,
            wins: 0,
            losses: 0,
            created_at,
        };

        self.players.insert(player.id, player.clone());
        Ok(player)
    }

    /// Record a match and apply both player updates.
    ///
    /// Nothing is modified unless every referenced player exists.
    pub fn apply_match(
        &mut self,
        record: NewMatchRecord,
        updates: [PlayerUpdate; 2],
    ) -> Result<MatchRecord, LadderError> {
        for player_id in [record.player1_id, record.player2_id]
            .into_iter()
            .chain(updates.iter().map(|update| update.player_id))
        {
            if !self.players.contains_key(&player_id) {
                return Err(LadderError::PlayerNotFound { player_id });
            }
        }

        self.next_match_id += 1;
        let stored = MatchRecord {
            id: self.next_match_id,
            player1_id: record.player1_id,
            player2_id: record.player2_id,
            format: record.format,
            sets_won1: record.tally.sets_won1,
            sets_won2: record.tally.sets_won2,
            set_scores: record.set_scores,
            player1_rating_before: record.player1_rating_before,
            player2_rating_before: record.player2_rating_before,
            player1_rating_after: record.player1_rating_after,
            player2_rating_after: record.player2_rating_after,
            played_at: record.played_at,
        };

        for update in updates {
            if let Some(player) = self.players.get_mut(&update.player_id) {
                player.rating = update.rating;
                if update.won {
                    player.wins += 1;
                } else {
                    player.losses += 1;
                }
            }
        }

        self.matches.push(stored.clone());
        Ok(stored)
    }

    /// Match records sorted newest first
    pub fn matches_newest_first(&self) -> Vec<MatchRecord> {
        let mut matches = self.matches.clone();
        matches.sort_by(|a, b| b.played_at.cmp(&a.played_at).then(b.id.cmp(&a.id)));
        matches
    }
}
