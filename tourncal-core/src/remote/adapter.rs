//! The seam between the reconciliation engine and a remote calendar system.

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::event::CanonicalEvent;

/// Operations the engine needs from a remote calendar.
///
/// Every call may fail with a transport-level error; the reconciler
/// isolates such failures per event. `exists` returns `Ok(false)` only
/// when the remote definitively reports the entity missing — transport
/// failures must surface as `Err` so the repair pass can tell "gone"
/// apart from "unknown".
#[async_trait]
pub trait RemoteCalendar: Send + Sync {
    /// Create a remote entry for `event`, returning the remote-assigned id.
    async fn create(&self, event: &CanonicalEvent) -> SyncResult<String>;

    /// Replace the remote entry's fields with `event`'s current ones.
    async fn update(&self, remote_id: &str, event: &CanonicalEvent) -> SyncResult<()>;

    async fn delete(&self, remote_id: &str) -> SyncResult<()>;

    async fn exists(&self, remote_id: &str) -> SyncResult<bool>;
}
