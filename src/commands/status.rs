use anyhow::Result;
use tourncal_core::state::{StateStore, StoreConfig};
use tourncal_core::sync::Reconciler;

use crate::config::Config;
use crate::{commands, events};

pub fn run(cfg: &Config) -> Result<()> {
    if cfg.sources.is_empty() {
        anyhow::bail!(
            "No sources configured.\n\
            Add [sources.<name>] entries to config.toml"
        );
    }

    let registry = commands::build_registry(cfg);
    let store = StateStore::new(StoreConfig::new(cfg.state_path.clone()));

    for (name, source) in &cfg.sources {
        let events = events::load_events(&source.events_path)?;
        let adapter = commands::resolve_adapter(&registry, source)?;
        let plan = Reconciler::new(&store, adapter).plan(name, &events)?;

        println!("{name}:");
        if plan.is_empty() {
            println!("  up to date ({} unchanged)", plan.unchanged);
            continue;
        }
        for id in &plan.to_create {
            println!("  create {id}");
        }
        for id in &plan.to_update {
            println!("  update {id}");
        }
        for id in &plan.to_delete {
            println!("  delete {id}");
        }
        if plan.invalid > 0 {
            println!("  ({} malformed events skipped)", plan.invalid);
        }
    }

    Ok(())
}
