//! Content digests for stored cache values.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hex digest of a serialized cache value.
///
/// Stored next to each entry so a refresh can tell whether the remote
/// resource actually changed.
pub fn compute_content_hash(value_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value_json.as_bytes());
    hex::encode(hasher.finalize())
}
