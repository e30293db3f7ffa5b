//! Core types and shared functionality for offcache.
//!
//! This crate provides:
//! - Cache store implementation with SQLite backend
//! - Request/response values
//! - Cache generation identity and the resource manifest
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod generation;
pub mod http;
pub mod manifest;

pub use cache::{CacheDb, CacheEntry, CacheStore};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use generation::Generation;
pub use http::{Headers, Request, Response};
pub use manifest::ResourceManifest;
