//! Structured resolve failures.
//!
//! Every variant is recovered by the fallback step; none reaches the host.

use offcache_core::Error;

/// Why a request could not be answered from cache or network.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The request URL could not be parsed or canonicalized.
    #[error("INVALID_REQUEST: {0}")]
    InvalidRequest(String),

    /// The cache store failed while matching.
    #[error("STORE_ERROR: {0}")]
    Store(Error),

    /// The live network fetch rejected.
    #[error("NETWORK_ERROR: {0}")]
    Network(Error),

    /// A GET request arrived without an Accept header.
    #[error("MISSING_ACCEPT: {0}")]
    MissingAccept(String),

    /// A document missed the cache and the offline page is not cached either.
    #[error("OFFLINE_PAGE_MISSING: {0}")]
    OfflinePageMissing(String),
}
