//! The reconciliation pass: diff-and-apply between a canonical event set
//! and persisted sync state for one source.

mod action;
mod reconciler;
mod repair;

pub use action::{PassStats, RepairStats, SyncPlan};
pub use reconciler::{CancelFlag, Reconciler};
pub use repair::Repairer;

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use crate::error::{SyncError, SyncResult};
    use crate::event::{CanonicalEvent, EventLocation};
    use crate::remote::RemoteCalendar;

    pub fn event(id: &str, name: &str) -> CanonicalEvent {
        CanonicalEvent {
            id: id.to_string(),
            name: name.to_string(),
            date_start: Utc.with_ymd_and_hms(2025, 1, 7, 0, 0, 0).unwrap(),
            date_end: Utc.with_ymd_and_hms(2025, 1, 12, 0, 0, 0).unwrap(),
            location: EventLocation::default(),
            category: None,
            level: None,
            prize: None,
            url: None,
            description: None,
            source: "test".to_string(),
            last_updated: None,
        }
    }

    /// In-memory remote with scriptable failures.
    #[derive(Default)]
    pub struct MockRemote {
        /// remote_id -> event name
        pub entries: Mutex<HashMap<String, String>>,
        /// event ids whose create/update fails, remote ids whose delete fails
        pub fail_ids: Mutex<HashSet<String>>,
        /// remote ids whose existence check errors (simulated timeout)
        pub flaky_exists: Mutex<HashSet<String>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl MockRemote {
        pub fn fail_on(&self, id: &str) {
            self.fail_ids.lock().unwrap().insert(id.to_string());
        }

        pub fn clear_failures(&self) {
            self.fail_ids.lock().unwrap().clear();
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RemoteCalendar for MockRemote {
        async fn create(&self, event: &CanonicalEvent) -> SyncResult<String> {
            self.calls.lock().unwrap().push(format!("create {}", event.id));
            if self.fail_ids.lock().unwrap().contains(&event.id) {
                return Err(SyncError::Provider("simulated transport failure".into()));
            }
            let remote_id = format!("remote-{}", event.id);
            self.entries
                .lock()
                .unwrap()
                .insert(remote_id.clone(), event.name.clone());
            Ok(remote_id)
        }

        async fn update(&self, remote_id: &str, event: &CanonicalEvent) -> SyncResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("update {remote_id}"));
            if self.fail_ids.lock().unwrap().contains(&event.id) {
                return Err(SyncError::Provider("simulated transport failure".into()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(remote_id.to_string(), event.name.clone());
            Ok(())
        }

        async fn delete(&self, remote_id: &str) -> SyncResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("delete {remote_id}"));
            if self.fail_ids.lock().unwrap().contains(remote_id) {
                return Err(SyncError::Provider("simulated transport failure".into()));
            }
            self.entries.lock().unwrap().remove(remote_id);
            Ok(())
        }

        async fn exists(&self, remote_id: &str) -> SyncResult<bool> {
            if self.flaky_exists.lock().unwrap().contains(remote_id) {
                return Err(SyncError::ProviderTimeout(30));
            }
            Ok(self.entries.lock().unwrap().contains_key(remote_id))
        }
    }
}
