//! Request key generation.

use sha2::{Digest, Sha256};

/// Compute the storage key for a cacheable (GET) request to `url`.
///
/// Only GET requests are ever stored, so the method is fixed in the key.
pub fn compute_request_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"GET");
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
