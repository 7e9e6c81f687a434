//! In-memory ladder storage

use crate::error::LadderError;
use crate::storage::{LadderState, LadderStorage};
use crate::types::{MatchRecord, NewMatchRecord, Player, PlayerId, PlayerUpdate, Rating};
use chrono::{DateTime, Utc};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory storage implementation
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    state: RwLock<LadderState>,
}

impl InMemoryStorage {
    /// Create an empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with a ladder state
    pub fn with_state(state: LadderState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Copy of the current ladder contents
    pub fn snapshot(&self) -> crate::error::Result<LadderState> {
        Ok(self.read()?.clone())
    }

    /// Swap in a new ladder state wholesale
    pub fn replace(&self, state: LadderState) -> crate::error::Result<()> {
        *self.write()? = state;
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LadderState>, LadderError> {
        self.state.read().map_err(|_| LadderError::StorageError {
            message: "Failed to acquire ladder read lock".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LadderState>, LadderError> {
        self.state.write().map_err(|_| LadderError::StorageError {
            message: "Failed to acquire ladder write lock".to_string(),
        })
    }
}

impl LadderStorage for InMemoryStorage {
    fn get_player(&self, player_id: PlayerId) -> crate::error::Result<Option<Player>> {
        Ok(self.read()?.player(player_id).cloned())
    }

    fn find_player_by_name(&self, name: &str) -> crate::error::Result<Option<Player>> {
        Ok(self.read()?.player_by_name(name).cloned())
    }

    fn list_players(&self) -> crate::error::Result<Vec<Player>> {
        Ok(self.read()?.players().cloned().collect())
    }

    fn insert_player(
        &self,
        name: &str,
        rating: Rating,
        created_at: DateTime<Utc>,
    ) -> crate::error::Result<Player> {
        let mut state = self.write()?;
        Ok(state.insert_player(name, rating, created_at)?)
    }

    fn apply_match(
        &self,
        record: NewMatchRecord,
        updates: [PlayerUpdate; 2],
    ) -> crate::error::Result<MatchRecord> {
        let mut state = self.write()?;
        Ok(state.apply_match(record, updates)?)
    }

    fn list_matches(&self) -> crate::error::Result<Vec<MatchRecord>> {
        Ok(self.read()?.matches_newest_first())
    }

    fn player_count(&self) -> crate::error::Result<usize> {
        Ok(self.read()?.player_count())
    }

    fn match_count(&self) -> crate::error::Result<usize> {
        Ok(self.read()?.match_count())
    }
}
