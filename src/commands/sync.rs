use anyhow::Result;
use tourncal_core::state::{StateStore, StoreConfig};
use tourncal_core::sync::{CancelFlag, Reconciler};

use crate::config::Config;
use crate::{commands, events};

pub async fn run(cfg: &Config, only: Option<&str>, dry_run: bool) -> Result<()> {
    if cfg.sources.is_empty() {
        anyhow::bail!(
            "No sources configured.\n\
            Add [sources.<name>] entries to config.toml"
        );
    }

    let registry = commands::build_registry(cfg);
    let store = StateStore::new(StoreConfig::new(cfg.state_path.clone()));

    // Ctrl-C stops between events; everything applied so far is journaled
    // and persisted.
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; finishing current event and persisting");
                cancel.cancel();
            }
        });
    }

    for (name, source) in &cfg.sources {
        if only.is_some_and(|s| s != name.as_str()) {
            continue;
        }
        if cancel.is_cancelled() {
            break;
        }

        let events = match events::load_events(&source.events_path) {
            Ok(events) => events,
            Err(err) => {
                tracing::error!(source = %name, error = %err, "failed to load canonical events");
                continue;
            }
        };

        let adapter = commands::resolve_adapter(&registry, source)?;
        let reconciler = Reconciler::new(&store, adapter);

        if dry_run {
            let plan = reconciler.plan(name, &events)?;
            println!(
                "{name}: would create {}, update {}, delete {} ({} unchanged, {} invalid)",
                plan.to_create.len(),
                plan.to_update.len(),
                plan.to_delete.len(),
                plan.unchanged,
                plan.invalid
            );
            continue;
        }

        let stats = reconciler
            .reconcile(name, &source.collection_id, &events, &cancel)
            .await?;
        println!(
            "{name}: {} created, {} updated, {} unchanged, {} deleted, {} failed, {} invalid",
            stats.created, stats.updated, stats.unchanged, stats.deleted, stats.failed, stats.invalid
        );
    }

    Ok(())
}
