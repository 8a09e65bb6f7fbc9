//! Content hashing for change detection.
//!
//! Two events are considered "unchanged" iff their digests are equal, which
//! is what lets the reconciler skip remote calls entirely for converged
//! events.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::event::CanonicalEvent;

/// Hex characters kept from the SHA-256 digest. 64 bits keeps the state
/// document compact and is comfortably collision-free for tens of
/// thousands of entries.
const DIGEST_LEN: usize = 16;

/// The display-relevant projection of an event, with fields in canonical
/// (sorted) key order. Bookkeeping fields (`description`, `source`,
/// `lastUpdated`) are deliberately absent so metadata churn never produces
/// a spurious diff.
#[derive(Serialize)]
struct Projection<'a> {
    category: Option<&'a str>,
    city: Option<&'a str>,
    country: Option<&'a str>,
    date_end: &'a chrono::DateTime<chrono::Utc>,
    date_start: &'a chrono::DateTime<chrono::Utc>,
    level: Option<&'a str>,
    name: &'a str,
    prize: Option<&'a str>,
    url: Option<&'a str>,
    venue: Option<&'a str>,
}

/// Digest the fields that affect the remote entity's visible representation.
///
/// Pure and deterministic: the projection struct fixes the serialization
/// order, so the digest can never depend on how an input document ordered
/// its keys.
pub fn content_hash(event: &CanonicalEvent) -> String {
    let projection = Projection {
        category: event.category.as_deref(),
        city: event.location.city.as_deref(),
        country: event.location.country.as_deref(),
        date_end: &event.date_end,
        date_start: &event.date_start,
        level: event.level.as_deref(),
        name: &event.name,
        prize: event.prize.as_deref(),
        url: event.url.as_deref(),
        venue: event.location.venue.as_deref(),
    };
    let json =
        serde_json::to_string(&projection).expect("projection contains only serializable fields");

    let mut digest = hex::encode(Sha256::digest(json.as_bytes()));
    digest.truncate(DIGEST_LEN);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLocation;
    use chrono::{TimeZone, Utc};

    fn event() -> CanonicalEvent {
        CanonicalEvent {
            id: "A".to_string(),
            name: "India Open".to_string(),
            date_start: Utc.with_ymd_and_hms(2025, 1, 7, 0, 0, 0).unwrap(),
            date_end: Utc.with_ymd_and_hms(2025, 1, 12, 0, 0, 0).unwrap(),
            location: EventLocation {
                city: Some("New Delhi".to_string()),
                country: Some("India".to_string()),
                venue: None,
            },
            category: Some("Super 750".to_string()),
            level: Some("international".to_string()),
            prize: Some("$950,000".to_string()),
            url: None,
            description: Some("first draft".to_string()),
            source: "bwf".to_string(),
            last_updated: None,
        }
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(content_hash(&event()), content_hash(&event()));
        assert_eq!(content_hash(&event()).len(), DIGEST_LEN);
    }

    #[test]
    fn test_bookkeeping_fields_do_not_affect_hash() {
        let base = event();
        let mut churned = event();
        churned.description = Some("rewritten description".to_string());
        churned.source = "bwf-v2".to_string();
        churned.last_updated = Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
        assert_eq!(content_hash(&base), content_hash(&churned));
    }

    #[test]
    fn test_display_fields_affect_hash() {
        let base = event();

        let mut renamed = event();
        renamed.name = "India Open 2025".to_string();
        assert_ne!(content_hash(&base), content_hash(&renamed));

        let mut moved = event();
        moved.location.venue = Some("Indira Gandhi Arena".to_string());
        assert_ne!(content_hash(&base), content_hash(&moved));

        let mut rescheduled = event();
        rescheduled.date_end = Utc.with_ymd_and_hms(2025, 1, 13, 0, 0, 0).unwrap();
        assert_ne!(content_hash(&base), content_hash(&rescheduled));
    }
}
