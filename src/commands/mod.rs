pub mod repair;
pub mod status;
pub mod sync;

use std::sync::Arc;

use anyhow::Result;
use tourncal_core::remote::{ProviderRegistry, RemoteCalendar};

use crate::config::{Config, SourceConfig};

/// Build the provider table from the configured sources, resolved once at
/// startup.
pub fn build_registry(cfg: &Config) -> ProviderRegistry {
    ProviderRegistry::with_subprocess_providers(
        cfg.sources.values().map(|source| source.provider.as_str()),
    )
}

pub fn resolve_adapter(
    registry: &ProviderRegistry,
    source: &SourceConfig,
) -> Result<Arc<dyn RemoteCalendar>> {
    Ok(registry.resolve(&source.provider, &source.collection_id, &source.params_json())?)
}
