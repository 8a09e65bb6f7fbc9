//! Provider subprocess transport.
//!
//! Each call spawns the provider binary, writes one JSON request to its
//! stdin and reads one JSON response from its stdout, bounded by a
//! timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::error::{SyncError, SyncResult};
use crate::event::CanonicalEvent;
use crate::remote::adapter::RemoteCalendar;
use crate::remote::protocol::{
    Command, CreateEntry, DeleteEntry, EntryExists, ProviderCommand, Request, Response,
    UpdateEntry,
};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// A provider, addressed by name and resolved to a `tourncal-provider-{name}`
/// binary on PATH.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    fn binary_path(&self) -> SyncResult<std::path::PathBuf> {
        let binary_name = format!("tourncal-provider-{}", self.0);
        let binary_path = which::which(&binary_name).map_err(|_| {
            SyncError::ProviderNotInstalled(format!(
                "Provider '{}' not found. Install it with:\n  cargo install {}",
                self.0, binary_name
            ))
        })?;
        Ok(binary_path)
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type,
    /// ensuring compile-time type safety.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> SyncResult<C::Response> {
        timeout(PROVIDER_TIMEOUT, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| SyncError::ProviderTimeout(PROVIDER_TIMEOUT.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes
    /// the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> SyncResult<R> {
        let params =
            serde_json::to_value(params).map_err(|e| SyncError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json =
            serde_json::to_string(&request).map_err(|e| SyncError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .spawn()
            .map_err(|e| {
                SyncError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        // Write request to stdin (unwrap safe: we piped stdin above)
        let mut stdin = child.stdin.take().unwrap();
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(SyncError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.is_empty() {
            return Err(SyncError::Provider("Provider returned no response".into()));
        }

        let response: Response<R> = serde_json::from_str(&response_str)
            .map_err(|e| SyncError::Provider(format!("Failed to parse response: {}", e)))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } => Err(SyncError::Provider(error)),
        }
    }
}

/// A remote calendar collection reached through a provider binary.
#[derive(Clone, Debug)]
pub struct ProviderRemote {
    provider: Provider,
    collection_id: String,
    params: serde_json::Map<String, serde_json::Value>,
}

impl ProviderRemote {
    pub fn new(
        provider: Provider,
        collection_id: String,
        params: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        ProviderRemote {
            provider,
            collection_id,
            params,
        }
    }
}

#[async_trait]
impl RemoteCalendar for ProviderRemote {
    async fn create(&self, event: &CanonicalEvent) -> SyncResult<String> {
        self.provider
            .call(CreateEntry {
                params: self.params.clone(),
                collection_id: self.collection_id.clone(),
                event: event.clone(),
            })
            .await
    }

    async fn update(&self, remote_id: &str, event: &CanonicalEvent) -> SyncResult<()> {
        self.provider
            .call(UpdateEntry {
                params: self.params.clone(),
                collection_id: self.collection_id.clone(),
                entry_id: remote_id.to_string(),
                event: event.clone(),
            })
            .await
    }

    async fn delete(&self, remote_id: &str) -> SyncResult<()> {
        self.provider
            .call(DeleteEntry {
                params: self.params.clone(),
                collection_id: self.collection_id.clone(),
                entry_id: remote_id.to_string(),
            })
            .await
    }

    async fn exists(&self, remote_id: &str) -> SyncResult<bool> {
        self.provider
            .call(EntryExists {
                params: self.params.clone(),
                collection_id: self.collection_id.clone(),
                entry_id: remote_id.to_string(),
            })
            .await
    }
}
