//! Append-only intent log for incremental persistence.
//!
//! The state document is replaced wholesale at the end of a pass, which
//! would leave a window where a crash after several successful remote
//! CREATEs loses the new mappings and duplicates the entities on the next
//! run. The journal closes that window: every successful remote mutation
//! is appended here before the next event is processed, and
//! `StateStore::load` replays a leftover journal over the last saved
//! document.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{SyncRecord, SyncState};
use crate::error::{SyncError, SyncResult};

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalOp {
    #[serde(rename_all = "camelCase")]
    Created {
        remote_id: String,
        content_hash: String,
    },
    #[serde(rename_all = "camelCase")]
    Updated {
        content_hash: String,
    },
    Deleted,
}

/// One line of the journal: a successful remote mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Pass that produced this entry.
    pub run_id: String,
    pub source: String,
    pub event_id: String,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub op: JournalOp,
}

/// JSON-lines intent log living beside the state document.
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: PathBuf) -> Self {
        Journal { path }
    }

    /// `sync-state.json` -> `sync-state.json.journal`
    pub fn for_state_file(state_path: &Path) -> Self {
        let mut os = state_path.as_os_str().to_owned();
        os.push(".journal");
        Journal::new(PathBuf::from(os))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry, synced to disk before returning.
    ///
    /// A failure here is fatal to the pass: an unrecorded remote mutation
    /// would re-open the crash window the journal exists to close.
    pub fn append(&self, entry: &JournalEntry) -> SyncResult<()> {
        let line = serde_json::to_string(entry)
            .map_err(|e| SyncError::Serialization(e.to_string()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        file.sync_data()?;
        Ok(())
    }

    /// Apply a leftover journal to `state`, returning the number of
    /// entries applied. An unparsable line (torn final write of a crashed
    /// process) is skipped with a warning.
    pub fn replay(&self, state: &mut SyncState) -> SyncResult<usize> {
        if !self.path.exists() {
            return Ok(0);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut applied = 0;

        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let entry: JournalEntry = match serde_json::from_str(line) {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping torn journal line");
                    continue;
                }
            };

            let source = state.source_mut(&entry.source);
            match entry.op {
                JournalOp::Created {
                    remote_id,
                    content_hash,
                } => {
                    source.records.insert(
                        entry.event_id,
                        SyncRecord {
                            remote_id,
                            last_synced_at: entry.at,
                            content_hash,
                        },
                    );
                }
                JournalOp::Updated { content_hash } => {
                    if let Some(record) = source.records.get_mut(&entry.event_id) {
                        record.content_hash = content_hash;
                        record.last_synced_at = entry.at;
                    }
                }
                JournalOp::Deleted => {
                    source.records.remove(&entry.event_id);
                }
            }
            applied += 1;
        }

        Ok(applied)
    }

    /// Remove the journal once the full document has been saved.
    pub fn clear(&self) -> SyncResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
