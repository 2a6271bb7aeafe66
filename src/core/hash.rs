// Hashing utilities

use sha2::{Sha256, Digest};
use crate::core::{Hash256, TemplateError};

/// Single SHA256 hash
pub fn sha256_hash(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    result
}

/// SHA256 of `data` as lowercase hex, the form the difficulty predicate works on
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Transactions root: one SHA256 over the raw bytes of every pending
/// transaction, concatenated in the order the node listed them.
/// Not a binary tree; an empty list hashes the empty string.
pub fn merkle_root<S: AsRef<str>>(transactions: &[S]) -> Result<Hash256, TemplateError> {
    let mut hasher = Sha256::new();

    for tx in transactions {
        let data = hex::decode(tx.as_ref()).map_err(|e| TemplateError::InvalidHex {
            field: "transaction",
            reason: e.to_string(),
        })?;
        hasher.update(&data);
    }

    let mut root = [0u8; 32];
    root.copy_from_slice(&hasher.finalize());
    Ok(Hash256::new(root))
}
