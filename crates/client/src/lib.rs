//! Network side of offcache.
//!
//! This crate provides the live fetch collaborator used when the cache
//! cannot answer, plus locator resolution against the controlled origin.

pub mod fetch;

pub use fetch::{Fetch, FetchClient, FetchConfig, UrlError, canonicalize, resolve_locator};
