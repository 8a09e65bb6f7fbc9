//! JSON protocol between the engine and provider binaries.
//!
//! Providers are standalone executables (`tourncal-provider-google`, ...)
//! that receive one request on stdin and answer with one response on
//! stdout. The protocol is language-agnostic: any executable that speaks
//! it can be a provider. Providers manage their own credentials and
//! tokens; the engine just forwards provider-specific parameters from the
//! source config.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::event::CanonicalEvent;

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    CreateEntry,
    UpdateEntry,
    DeleteEntry,
    EntryExists,
}

/// Request sent from the engine to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a provider to the engine.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data }).unwrap()
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        serde_json::to_string(&Response::<()>::Error {
            error: msg.to_string(),
        })
        .unwrap()
    }
}

/// Create a remote entry; responds with the remote-assigned id.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEntry {
    /// Provider-specific config (e.g. google_account)
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
    pub collection_id: String,
    pub event: CanonicalEvent,
}

impl ProviderCommand for CreateEntry {
    type Response = String;
    fn command() -> Command {
        Command::CreateEntry
    }
}

/// Replace an existing entry's fields.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEntry {
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
    pub collection_id: String,
    pub entry_id: String,
    pub event: CanonicalEvent,
}

impl ProviderCommand for UpdateEntry {
    type Response = ();
    fn command() -> Command {
        Command::UpdateEntry
    }
}

/// Delete an entry by remote id.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEntry {
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
    pub collection_id: String,
    pub entry_id: String,
}

impl ProviderCommand for DeleteEntry {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEntry
    }
}

/// Ask whether an entry still exists.
///
/// `false` means the remote definitively reported not-found; transport
/// trouble must be answered with an error response instead.
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryExists {
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
    pub collection_id: String,
    pub entry_id: String,
}

impl ProviderCommand for EntryExists {
    type Response = bool;
    fn command() -> Command {
        Command::EntryExists
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&Command::CreateEntry).unwrap(),
            "\"create_entry\""
        );
        assert_eq!(
            serde_json::to_string(&Command::EntryExists).unwrap(),
            "\"entry_exists\""
        );
    }

    #[test]
    fn test_response_envelope_roundtrip() {
        let ok: Response<String> =
            serde_json::from_str(r#"{"status":"success","data":"remote-123"}"#).unwrap();
        assert!(matches!(ok, Response::Success { data } if data == "remote-123"));

        let err: Response<String> =
            serde_json::from_str(r#"{"status":"error","error":"rate limited"}"#).unwrap();
        assert!(matches!(err, Response::Error { error } if error == "rate limited"));

        assert_eq!(
            Response::success(true),
            r#"{"status":"success","data":true}"#
        );
    }

    #[test]
    fn test_params_are_flattened_into_request() {
        let mut params = serde_json::Map::new();
        params.insert("google_account".to_string(), "cal@example.com".into());
        let cmd = DeleteEntry {
            params,
            collection_id: "primary".to_string(),
            entry_id: "remote-123".to_string(),
        };
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["google_account"], "cal@example.com");
        assert_eq!(value["collection_id"], "primary");
        assert_eq!(value["entry_id"], "remote-123");
    }
}
