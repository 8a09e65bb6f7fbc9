//! Load/save of the sync state document.

use std::path::PathBuf;
use std::time::Duration;

use super::{Journal, SyncState, STATE_VERSION};
use crate::error::{SyncError, SyncResult};

/// Explicit store configuration, passed into the engine rather than read
/// from ambient globals.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the JSON state document.
    pub path: PathBuf,
    /// Write attempts before a save is declared pass-fatal.
    pub max_write_attempts: u32,
    /// Backoff before the first retry; doubles per attempt.
    pub retry_backoff: Duration,
}

impl StoreConfig {
    pub fn new(path: PathBuf) -> Self {
        StoreConfig {
            path,
            max_write_attempts: 3,
            retry_backoff: Duration::from_millis(200),
        }
    }
}

/// File-backed store for the sync state document.
///
/// At most one reconciliation pass per source may run against the store at
/// a time; no distributed locking is provided.
pub struct StateStore {
    config: StoreConfig,
    journal: Journal,
}

impl StateStore {
    pub fn new(config: StoreConfig) -> Self {
        let journal = Journal::for_state_file(&config.path);
        StateStore { config, journal }
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Load the persisted document, replaying any leftover journal from a
    /// crashed pass. A missing file is the normal bootstrap condition, not
    /// an error.
    pub fn load(&self) -> SyncResult<SyncState> {
        let mut state = match std::fs::read_to_string(&self.config.path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                SyncError::Store(format!(
                    "corrupt state document {}: {}",
                    self.config.path.display(),
                    e
                ))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => SyncState::default(),
            Err(err) => return Err(err.into()),
        };

        if state.version != STATE_VERSION {
            tracing::debug!(
                from = state.version,
                to = STATE_VERSION,
                "migrating state document version"
            );
            state.version = STATE_VERSION;
        }

        let replayed = self.journal.replay(&mut state)?;
        if replayed > 0 {
            tracing::info!(entries = replayed, "recovered unsaved mutations from journal");
        }

        Ok(state)
    }

    /// Serialize and replace the document wholesale, retrying transient
    /// write failures with doubling backoff. Exhaustion is pass-fatal:
    /// accepting in-memory state as durable without persisting it would
    /// desynchronize future runs. The journal is cleared on success.
    pub async fn save(&self, state: &SyncState) -> SyncResult<()> {
        let mut backoff = self.config.retry_backoff;
        let mut last_err = None;

        for attempt in 1..=self.config.max_write_attempts {
            match self.write_once(state) {
                Ok(()) => {
                    self.journal.clear()?;
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "state write failed");
                    last_err = Some(err);
                    if attempt < self.config.max_write_attempts {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        Err(SyncError::Store(format!(
            "giving up on state write after {} attempts: {}",
            self.config.max_write_attempts,
            last_err.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    fn write_once(&self, state: &SyncState) -> SyncResult<()> {
        if let Some(parent) = self.config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| SyncError::Serialization(e.to_string()))?;

        // Write-then-rename so a crash mid-write never leaves a truncated document
        let tmp = self.config.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.config.path)?;
        Ok(())
    }
}
