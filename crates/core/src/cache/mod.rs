//! SQLite-backed bucket store for cache generations.
//!
//! This module provides the persistent store that outlives any single
//! worker instance, using SQLite with async access via tokio-rusqlite:
//!
//! - Named buckets, one per cache generation
//! - Request-keyed entries hashed with SHA-256
//! - Automatic schema migrations
//! - WAL mode so several worker processes can share one file

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use store::{CacheEntry, CacheStore};
