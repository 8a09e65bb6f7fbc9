//! The core reconciliation state machine.
//!
//! One pass loads the persisted state, decides CREATE/UPDATE/SKIP per
//! canonical event, deletes orphaned records afterwards, and saves the
//! state once at the end. Every successful remote mutation is journaled
//! before the next event is processed, so a crash mid-pass never
//! re-creates entities on the next run.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::SyncResult;
use crate::event::CanonicalEvent;
use crate::hash::content_hash;
use crate::remote::RemoteCalendar;
use crate::state::{
    JournalEntry, JournalOp, SourceStats, SourceSyncState, StateStore, SyncRecord,
};

use super::{PassStats, SyncPlan};

/// Cooperative cancellation flag, checked between per-event iterations.
///
/// A cancelled pass behaves as if it simply stopped early: every mutation
/// applied so far is already journaled and the final save still runs.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct Reconciler<'a> {
    store: &'a StateStore,
    adapter: Arc<dyn RemoteCalendar>,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a StateStore, adapter: Arc<dyn RemoteCalendar>) -> Self {
        Reconciler { store, adapter }
    }

    /// Run one reconciliation pass for `source_id`.
    ///
    /// Per-event remote failures are absorbed into the returned stats and
    /// leave the affected record in its prior state, so re-running with
    /// the same canonical set retries exactly the operations that did not
    /// succeed. Only store-level errors abort the pass.
    pub async fn reconcile(
        &self,
        source_id: &str,
        collection_id: &str,
        events: &[CanonicalEvent],
        cancel: &CancelFlag,
    ) -> SyncResult<PassStats> {
        let run_id = Uuid::new_v4().to_string();
        let mut state = self.store.load()?;
        let source = state.source_mut(source_id);
        source.remote_collection_id = collection_id.to_string();

        let mut stats = PassStats::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for event in events {
            if cancel.is_cancelled() {
                tracing::info!(source = source_id, "pass cancelled; stopping early");
                break;
            }

            if let Err(err) = event.validate() {
                tracing::warn!(source = source_id, error = %err, "skipping malformed event");
                stats.invalid += 1;
                // A malformed event is still reported by the source, so its
                // existing record must not be treated as an orphan.
                if !event.id.is_empty() {
                    seen.insert(event.id.as_str());
                }
                continue;
            }
            seen.insert(event.id.as_str());

            let digest = content_hash(event);
            let prior = source
                .records
                .get(&event.id)
                .map(|r| (r.remote_id.clone(), r.content_hash.clone()));

            match prior {
                Some((_, prior_hash)) if prior_hash == digest => {
                    stats.unchanged += 1;
                }
                Some((remote_id, _)) => match self.adapter.update(&remote_id, event).await {
                    Ok(()) => {
                        let now = Utc::now();
                        self.store.journal().append(&JournalEntry {
                            run_id: run_id.clone(),
                            source: source_id.to_string(),
                            event_id: event.id.clone(),
                            at: now,
                            op: JournalOp::Updated {
                                content_hash: digest.clone(),
                            },
                        })?;
                        source.records.insert(
                            event.id.clone(),
                            SyncRecord {
                                remote_id,
                                last_synced_at: now,
                                content_hash: digest,
                            },
                        );
                        stats.updated += 1;
                    }
                    Err(err) => {
                        tracing::warn!(source = source_id, event = %event.id, error = %err, "update failed");
                        stats.failed += 1;
                    }
                },
                None => match self.adapter.create(event).await {
                    Ok(remote_id) => {
                        let now = Utc::now();
                        self.store.journal().append(&JournalEntry {
                            run_id: run_id.clone(),
                            source: source_id.to_string(),
                            event_id: event.id.clone(),
                            at: now,
                            op: JournalOp::Created {
                                remote_id: remote_id.clone(),
                                content_hash: digest.clone(),
                            },
                        })?;
                        source.records.insert(
                            event.id.clone(),
                            SyncRecord {
                                remote_id,
                                last_synced_at: now,
                                content_hash: digest,
                            },
                        );
                        stats.created += 1;
                    }
                    Err(err) => {
                        tracing::warn!(source = source_id, event = %event.id, error = %err, "create failed");
                        stats.failed += 1;
                    }
                },
            }
        }

        // Orphans: ids synced before that the source no longer reports.
        // Runs only after every CREATE/UPDATE of this pass, and never when
        // the event loop was cut short (unprocessed events are not orphans).
        if !cancel.is_cancelled() {
            let mut orphans: Vec<(String, String)> = source
                .records
                .iter()
                .filter(|(id, _)| !seen.contains(id.as_str()))
                .map(|(id, record)| (id.clone(), record.remote_id.clone()))
                .collect();
            orphans.sort();

            for (event_id, remote_id) in orphans {
                if cancel.is_cancelled() {
                    break;
                }
                match self.adapter.delete(&remote_id).await {
                    Ok(()) => {
                        self.store.journal().append(&JournalEntry {
                            run_id: run_id.clone(),
                            source: source_id.to_string(),
                            event_id: event_id.clone(),
                            at: Utc::now(),
                            op: JournalOp::Deleted,
                        })?;
                        source.records.remove(&event_id);
                        stats.deleted += 1;
                    }
                    Err(err) => {
                        tracing::warn!(source = source_id, event = %event_id, error = %err, "delete failed");
                        stats.failed += 1;
                    }
                }
            }
        }

        source.stats = SourceStats {
            total_events: source.records.len(),
            last_update: Some(Utc::now()),
        };
        state.last_sync = Some(Utc::now());
        self.store.save(&state).await?;

        Ok(stats)
    }

    /// Compute the per-event actions without touching the remote or the
    /// journal. Used by `status` and dry runs.
    pub fn plan(&self, source_id: &str, events: &[CanonicalEvent]) -> SyncResult<SyncPlan> {
        let state = self.store.load()?;
        let empty = SourceSyncState::default();
        let source = state.source(source_id).unwrap_or(&empty);

        let mut plan = SyncPlan::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for event in events {
            if event.validate().is_err() {
                plan.invalid += 1;
                if !event.id.is_empty() {
                    seen.insert(event.id.as_str());
                }
                continue;
            }
            seen.insert(event.id.as_str());

            match source.records.get(&event.id) {
                Some(record) if record.content_hash == content_hash(event) => plan.unchanged += 1,
                Some(_) => plan.to_update.push(event.id.clone()),
                None => plan.to_create.push(event.id.clone()),
            }
        }

        for id in source.records.keys() {
            if !seen.contains(id.as_str()) {
                plan.to_delete.push(id.clone());
            }
        }

        plan.to_create.sort();
        plan.to_update.sort();
        plan.to_delete.sort();
        Ok(plan)
    }
}
