//! Content hashing for layers.
//!
//! Hashes are stable across processes: values are reduced to their persisted
//! JSON form before digesting, so a layer and its re-imported copy agree.

use sha2::{Digest, Sha256};

pub fn compute_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Digest of an ordered list of persisted values.
pub fn content_hash(values: &[serde_json::Value]) -> String {
    let joined = serde_json::Value::Array(values.to_vec()).to_string();
    compute_hash(&joined)
}
