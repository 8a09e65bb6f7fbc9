//! Remote calendar access.
//!
//! The engine talks to remote calendar systems through the `RemoteCalendar`
//! trait. The production implementation shells out to provider binaries
//! over a one-line JSON protocol; tests substitute in-memory fakes.

pub mod adapter;
pub mod protocol;
pub mod provider;
pub mod registry;

pub use adapter::RemoteCalendar;
pub use provider::{Provider, ProviderRemote};
pub use registry::{AdapterFactory, ProviderRegistry};
