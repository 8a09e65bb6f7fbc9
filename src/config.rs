//! CLI configuration at ~/.config/tourncal/config.toml.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

fn default_state_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tourncal")
        .join("sync-state.json")
}

#[derive(Deserialize, Clone)]
pub struct Config {
    /// Where the sync state document lives.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Sources to reconcile, keyed by source id.
    #[serde(default)]
    pub sources: BTreeMap<String, SourceConfig>,
}

#[derive(Deserialize, Clone)]
pub struct SourceConfig {
    /// Provider name; resolved to the `tourncal-provider-{name}` binary.
    pub provider: String,

    /// Remote collection the source's events are reconciled into.
    pub collection_id: String,

    /// JSON array of canonical events, produced by the upstream pipeline.
    pub events_path: PathBuf,

    /// Provider-specific parameters forwarded with every request
    /// (e.g. google_account).
    #[serde(default)]
    pub params: toml::Table,
}

impl SourceConfig {
    pub fn params_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.params
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("tourncal");

    Ok(config_dir.join("config.toml"))
}

pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("Invalid config at {}", path.display()))?;
    Ok(config)
}
