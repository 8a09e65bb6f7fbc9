//! Reconciliation engine for tournament calendars.
//!
//! This crate converges a remotely-held collection of calendar entries with a
//! locally computed canonical event set:
//! - `hash` fingerprints the display-relevant fields of an event so meaningful
//!   change is detected without remote calls
//! - `state` persists the mapping from canonical event identity to remote
//!   entity identity, with an intent journal covering the crash window
//! - `remote` is the adapter seam to provider binaries
//! - `sync` drives CREATE/UPDATE/SKIP/DELETE per event with failure isolation

pub mod error;
pub mod event;
pub mod hash;
pub mod remote;
pub mod state;
pub mod sync;

pub use error::{SyncError, SyncResult};
pub use event::{CanonicalEvent, EventLocation};
