//! Persisted sync state: the mapping from canonical event identity to
//! remote entity identity, plus the content digest at last successful sync.

mod journal;
mod store;

pub use journal::{Journal, JournalEntry, JournalOp};
pub use store::{StateStore, StoreConfig};

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version written by this build. Bump when the document layout changes.
pub const STATE_VERSION: u32 = 2;

/// One synced event: created on CREATE, mutated on UPDATE, purged on DELETE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecord {
    /// Opaque handle assigned by the remote system.
    pub remote_id: String,
    pub last_synced_at: DateTime<Utc>,
    /// Digest of the event at last successful sync.
    pub content_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStats {
    pub total_events: usize,
    pub last_update: Option<DateTime<Utc>>,
}

/// Sync state for one source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSyncState {
    #[serde(default)]
    pub remote_collection_id: String,
    /// Keyed by canonical event id; order irrelevant.
    #[serde(default)]
    pub records: HashMap<String, SyncRecord>,
    #[serde(default)]
    pub stats: SourceStats,
}

/// The single persisted document, replaced wholesale on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub version: u32,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sources: HashMap<String, SourceSyncState>,
}

impl Default for SyncState {
    fn default() -> Self {
        SyncState {
            version: STATE_VERSION,
            last_sync: None,
            sources: HashMap::new(),
        }
    }
}

impl SyncState {
    pub fn source(&self, source_id: &str) -> Option<&SourceSyncState> {
        self.sources.get(source_id)
    }

    pub fn source_mut(&mut self, source_id: &str) -> &mut SourceSyncState {
        self.sources.entry(source_id.to_string()).or_default()
    }
}
