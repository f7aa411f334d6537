// hasher.rs — SHA-256 hashing utilities.
//
// All hashes in the audit chain are SHA-256, encoded as 64-character
// lowercase hex strings for readability and JSON compatibility.

use sha2::{Digest, Sha256};

/// Name of the algorithm, reported in export manifests.
pub const HASH_ALGORITHM: &str = "sha-256";

/// Hash arbitrary bytes, returning a lowercase hex-encoded SHA-256 string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Hash a UTF-8 string, returning a lowercase hex-encoded SHA-256 string.
pub fn hash_str(s: &str) -> String {
    hash_bytes(s.as_bytes())
}
