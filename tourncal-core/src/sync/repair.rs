//! Drift audit between persisted mappings and remote truth.

use std::sync::Arc;

use crate::error::SyncResult;
use crate::remote::RemoteCalendar;
use crate::state::StateStore;

use super::RepairStats;

pub struct Repairer<'a> {
    store: &'a StateStore,
    adapter: Arc<dyn RemoteCalendar>,
}

impl<'a> Repairer<'a> {
    pub fn new(store: &'a StateStore, adapter: Arc<dyn RemoteCalendar>) -> Self {
        Repairer { store, adapter }
    }

    /// Audit every record for `source_id` against the remote.
    ///
    /// Only a definitive not-found purges a mapping. A transport failure
    /// leaves the record in place: the absence of the entity is
    /// unconfirmed, and purging on it would lose valid mappings. State is
    /// persisted only when something was actually purged.
    pub async fn repair(&self, source_id: &str) -> SyncResult<RepairStats> {
        let mut state = self.store.load()?;
        let Some(source) = state.sources.get_mut(source_id) else {
            return Ok(RepairStats::default());
        };

        let mut stats = RepairStats {
            repaired: 0,
            total: source.records.len(),
        };

        let mut mappings: Vec<(String, String)> = source
            .records
            .iter()
            .map(|(id, record)| (id.clone(), record.remote_id.clone()))
            .collect();
        mappings.sort();

        for (event_id, remote_id) in mappings {
            match self.adapter.exists(&remote_id).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::info!(source = source_id, event = %event_id, "purging stale mapping");
                    source.records.remove(&event_id);
                    stats.repaired += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        source = source_id,
                        event = %event_id,
                        error = %err,
                        "existence check failed; keeping record"
                    );
                }
            }
        }

        if stats.repaired > 0 {
            source.stats.total_events = source.records.len();
            self.store.save(&state).await?;
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StoreConfig;
    use crate::sync::testing::{event, MockRemote};
    use crate::sync::{CancelFlag, Reconciler};
    use std::time::Duration;

    fn store_at(dir: &std::path::Path) -> StateStore {
        let mut config = StoreConfig::new(dir.join("sync-state.json"));
        config.retry_backoff = Duration::from_millis(1);
        StateStore::new(config)
    }

    async fn seed(store: &StateStore, remote: Arc<MockRemote>) {
        Reconciler::new(store, remote)
            .reconcile(
                "bwf",
                "cal-1",
                &[event("A", "X"), event("B", "Y")],
                &CancelFlag::new(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_purges_definitively_missing_entities() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());
        let remote = Arc::new(MockRemote::default());
        seed(&store, remote.clone()).await;

        // Someone deleted A's entity behind our back
        remote.entries.lock().unwrap().remove("remote-A");

        let stats = Repairer::new(&store, remote.clone())
            .repair("bwf")
            .await
            .unwrap();
        assert_eq!(stats, RepairStats { repaired: 1, total: 2 });

        let records = store.load().unwrap().source("bwf").unwrap().records.clone();
        assert!(!records.contains_key("A"));
        assert!(records.contains_key("B"));
    }

    #[tokio::test]
    async fn test_transient_failure_never_purges() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());
        let remote = Arc::new(MockRemote::default());
        seed(&store, remote.clone()).await;

        // A's entity is gone AND its check times out: absence unconfirmed
        remote.entries.lock().unwrap().remove("remote-A");
        remote
            .flaky_exists
            .lock()
            .unwrap()
            .insert("remote-A".to_string());

        let stats = Repairer::new(&store, remote.clone())
            .repair("bwf")
            .await
            .unwrap();
        assert_eq!(stats, RepairStats { repaired: 0, total: 2 });
        assert!(store
            .load()
            .unwrap()
            .source("bwf")
            .unwrap()
            .records
            .contains_key("A"));
    }

    #[tokio::test]
    async fn test_unknown_source_is_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());
        let remote = Arc::new(MockRemote::default());
        let stats = Repairer::new(&store, remote).repair("nope").await.unwrap();
        assert_eq!(stats, RepairStats::default());
    }
}
