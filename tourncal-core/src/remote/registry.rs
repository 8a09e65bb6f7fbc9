//! Provider registration table.
//!
//! Adapters are registered by name at startup and resolved through an
//! explicit table, so adding a remote backend is a registration here, not
//! a dispatch special case somewhere in the engine.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{SyncError, SyncResult};
use crate::remote::adapter::RemoteCalendar;
use crate::remote::provider::{Provider, ProviderRemote};

/// Builds an adapter for a (collection id, provider params) pair.
pub type AdapterFactory = Arc<
    dyn Fn(&str, &serde_json::Map<String, serde_json::Value>) -> Arc<dyn RemoteCalendar>
        + Send
        + Sync,
>;

#[derive(Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, AdapterFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        ProviderRegistry::default()
    }

    /// Registry with the subprocess provider registered under each of
    /// `names` (resolved to `tourncal-provider-{name}` binaries).
    pub fn with_subprocess_providers<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut registry = Self::new();
        for name in names {
            let provider = Provider::from_name(name);
            registry.register(
                name,
                Arc::new(move |collection_id, params| {
                    Arc::new(ProviderRemote::new(
                        provider.clone(),
                        collection_id.to_string(),
                        params.clone(),
                    ))
                }),
            );
        }
        registry
    }

    pub fn register(&mut self, name: &str, factory: AdapterFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn resolve(
        &self,
        name: &str,
        collection_id: &str,
        params: &serde_json::Map<String, serde_json::Value>,
    ) -> SyncResult<Arc<dyn RemoteCalendar>> {
        let factory = self.factories.get(name).ok_or_else(|| {
            SyncError::Config(format!("no provider registered under '{name}'"))
        })?;
        Ok(factory(collection_id, params))
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncResult;
    use crate::event::CanonicalEvent;
    use async_trait::async_trait;

    struct NullRemote;

    #[async_trait]
    impl RemoteCalendar for NullRemote {
        async fn create(&self, _event: &CanonicalEvent) -> SyncResult<String> {
            Ok("null".to_string())
        }
        async fn update(&self, _remote_id: &str, _event: &CanonicalEvent) -> SyncResult<()> {
            Ok(())
        }
        async fn delete(&self, _remote_id: &str) -> SyncResult<()> {
            Ok(())
        }
        async fn exists(&self, _remote_id: &str) -> SyncResult<bool> {
            Ok(true)
        }
    }

    #[test]
    fn test_resolve_unknown_provider_is_config_error() {
        let registry = ProviderRegistry::new();
        let err = registry
            .resolve("google", "primary", &Default::default())
            .err()
            .unwrap();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[tokio::test]
    async fn test_registered_factory_is_used() {
        let mut registry = ProviderRegistry::with_subprocess_providers(["google"]);
        registry.register("fake", Arc::new(|_, _| Arc::new(NullRemote)));

        let adapter = registry
            .resolve("fake", "primary", &Default::default())
            .unwrap();
        assert_eq!(adapter.exists("anything").await.unwrap(), true);

        let mut names = registry.names();
        names.sort();
        assert_eq!(names, vec!["fake", "google"]);
    }
}
