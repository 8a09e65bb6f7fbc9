//! Canonical event provider boundary.
//!
//! Acquisition and field-mapping happen upstream; this side only reads the
//! JSON documents those stages emit, one array per source.

use std::path::Path;

use anyhow::{Context, Result};
use tourncal_core::CanonicalEvent;
use tracing::warn;

/// Load a source's canonical events.
///
/// Elements that fail to decode are skipped with a warning so one bad
/// entry never blocks the rest of the source. A missing or non-array
/// document is fatal for the source.
pub fn load_events(path: &Path) -> Result<Vec<CanonicalEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read events from {}", path.display()))?;
    let raw: Vec<serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array", path.display()))?;

    let mut events = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<CanonicalEvent>(value) {
            Ok(event) => events.push(event),
            Err(err) => {
                warn!(file = %path.display(), index, error = %err, "skipping malformed event")
            }
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loads_events_and_skips_malformed_elements() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id":"A","name":"X","dateStart":"2025-01-07T00:00:00Z","dateEnd":"2025-01-12T00:00:00Z","source":"bwf"}},
                {{"id":"B","name":"missing dates","source":"bwf"}},
                {{"id":"C","name":"Y","dateStart":"2025-02-01T00:00:00Z","dateEnd":"2025-02-03T00:00:00Z","source":"bwf"}}
            ]"#
        )
        .unwrap();

        let events = load_events(file.path()).unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        assert!(load_events(Path::new("/nonexistent/events.json")).is_err());
    }

    #[test]
    fn test_non_array_document_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"not":"an array"}}"#).unwrap();
        assert!(load_events(file.path()).is_err());
    }
}
