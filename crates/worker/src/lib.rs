//! The offcache worker: install-time population, fetch-time resolution and
//! activation-time cleanup over a shared cache store.

pub mod error;
pub mod events;
pub mod host;
pub mod populate;
pub mod reap;
pub mod resolve;
mod worker;

#[cfg(test)]
mod testing;

pub use error::ResolveError;
pub use events::{EventOutcome, LifecycleEvent};
pub use populate::Installed;
pub use reap::ReapReport;
pub use resolve::{AcceptClass, Resolution, fallback_response, placeholder_image};
pub use worker::Worker;
