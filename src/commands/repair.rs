use anyhow::Result;
use tourncal_core::state::{StateStore, StoreConfig};
use tourncal_core::sync::Repairer;

use crate::commands;
use crate::config::Config;

pub async fn run(cfg: &Config, only: Option<&str>) -> Result<()> {
    if cfg.sources.is_empty() {
        anyhow::bail!(
            "No sources configured.\n\
            Add [sources.<name>] entries to config.toml"
        );
    }

    let registry = commands::build_registry(cfg);
    let store = StateStore::new(StoreConfig::new(cfg.state_path.clone()));

    for (name, source) in &cfg.sources {
        if only.is_some_and(|s| s != name.as_str()) {
            continue;
        }

        let adapter = commands::resolve_adapter(&registry, source)?;
        let stats = Repairer::new(&store, adapter).repair(name).await?;
        println!("{name}: purged {} of {} records", stats.repaired, stats.total);
    }

    Ok(())
}
