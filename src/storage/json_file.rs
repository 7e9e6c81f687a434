//! Ladder storage persisted as a JSON snapshot file
//!
//! The whole ladder is kept in memory and rewritten to disk on every
//! mutation. A change becomes visible only after its snapshot is on disk,
//! so a failed write leaves the ladder as it was. A missing file on startup
//! means an empty ladder.

use crate::error::LadderError;
use crate::storage::{InMemoryStorage, LadderState, LadderStorage};
use crate::types::{MatchRecord, NewMatchRecord, Player, PlayerId, PlayerUpdate, Rating};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// JSON file backed storage
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    inner: InMemoryStorage,
    /// Serializes stage-save-swap so snapshots land on disk in order
    write_lock: Mutex<()>,
}

impl JsonFileStorage {
    /// Open the ladder stored at `path`, starting empty if it does not exist
    pub fn open(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref().to_path_buf();

        let state = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read ladder file {}", path.display()))?;
            let state: LadderState = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse ladder file {}", path.display()))?;
            info!(
                "Loaded ladder from {}: {} players, {} matches",
                path.display(),
                state.player_count(),
                state.match_count()
            );
            state
        } else {
            info!("No ladder file at {}, starting empty", path.display());
            LadderState::default()
        };

        Ok(Self {
            path,
            inner: InMemoryStorage::with_state(state),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the ladder, write the copy to disk and
    /// only then make it the live state
    fn commit<T>(
        &self,
        change: impl FnOnce(&mut LadderState) -> Result<T, LadderError>,
    ) -> crate::error::Result<T> {
        let _guard = self.lock_writes()?;

        let mut staged = self.inner.snapshot()?;
        let value = change(&mut staged)?;
        self.save(&staged)?;
        self.inner.replace(staged)?;

        Ok(value)
    }

    fn save(&self, state: &LadderState) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| LadderError::StorageError {
                    message: format!("Failed to create {}: {}", parent.display(), e),
                })?;
            }
        }

        // Write next to the target and rename so a crash never leaves half a file
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| LadderError::StorageError {
            message: format!("Failed to write {}: {}", tmp_path.display(), e),
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| LadderError::StorageError {
            message: format!("Failed to replace {}: {}", self.path.display(), e),
        })?;

        debug!("Saved ladder snapshot to {}", self.path.display());
        Ok(())
    }

    fn lock_writes(&self) -> Result<std::sync::MutexGuard<'_, ()>, LadderError> {
        self.write_lock.lock().map_err(|_| LadderError::StorageError {
            message: "Failed to acquire ladder file lock".to_string(),
        })
    }
}

impl LadderStorage for JsonFileStorage {
    fn get_player(&self, player_id: PlayerId) -> crate::error::Result<Option<Player>> {
        self.inner.get_player(player_id)
    }

    fn find_player_by_name(&self, name: &str) -> crate::error::Result<Option<Player>> {
        self.inner.find_player_by_name(name)
    }

    fn list_players(&self) -> crate::error::Result<Vec<Player>> {
        self.inner.list_players()
    }

    fn insert_player(
        &self,
        name: &str,
        rating: Rating,
        created_at: DateTime<Utc>,
    ) -> crate::error::Result<Player> {
        self.commit(|state| state.insert_player(name, rating, created_at))
    }

    fn apply_match(
        &self,
        record: NewMatchRecord,
        updates: [PlayerUpdate; 2],
    ) -> crate::error::Result<MatchRecord> {
        self.commit(|state| state.apply_match(record, updates))
    }

    fn list_matches(&self) -> crate::error::Result<Vec<MatchRecord>> {
        self.inner.list_matches()
    }

    fn player_count(&self) -> crate::error::Result<usize> {
        self.inner.player_count()
    }

    fn match_count(&self) -> crate::error::Result<usize> {
        self.inner.match_count()
    }
}
