//! Source-agnostic canonical event types.
//!
//! Upstream source adapters turn provider-specific tournament payloads into
//! these types; the reconciler works exclusively with them and treats each
//! event as immutable input, produced fresh every run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// A standardized tournament calendar event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    /// Stable identifier, unique within a source and across runs.
    pub id: String,
    pub name: String,
    pub date_start: DateTime<Utc>,
    pub date_end: DateTime<Utc>,
    #[serde(default)]
    pub location: EventLocation,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub prize: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Which source adapter produced this event.
    pub source: String,
    /// When the source last touched the event. Bookkeeping only; never
    /// part of the content digest.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Where an event takes place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLocation {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
}

impl CanonicalEvent {
    /// Check the fields the reconciler depends on.
    ///
    /// A failing event is skipped with a warning by the caller; it never
    /// aborts the pass.
    pub fn validate(&self) -> SyncResult<()> {
        if self.id.trim().is_empty() {
            return Err(SyncError::InvalidEvent("missing event id".into()));
        }
        if self.date_start > self.date_end {
            return Err(SyncError::InvalidEvent(format!(
                "event '{}' ends before it starts ({} > {})",
                self.id, self.date_start, self.date_end
            )));
        }
        Ok(())
    }
}
