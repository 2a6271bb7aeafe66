// Proof of Work validity predicate

use crate::consensus::DifficultyTarget;
use crate::core::sha256_hex;

/// Check a candidate block against a target.
///
/// `hex(sha256(block))` must start with `chunk`; when the difficulty is
/// fractional the character right after the prefix must also be in `charset`.
pub fn check_block_is_valid(
    block: &[u8],
    chunk: &str,
    prefix_len: usize,
    charset: &str,
    has_fraction: bool,
) -> bool {
    let hash = sha256_hex(block);
    hash_meets_target(&hash, chunk, prefix_len, charset, has_fraction)
}

/// Same predicate on an already computed hex hash
#[inline]
pub fn hash_meets_target(
    hash: &str,
    chunk: &str,
    prefix_len: usize,
    charset: &str,
    has_fraction: bool,
) -> bool {
    if !hash.starts_with(chunk) {
        return false;
    }
    if !has_fraction {
        return true;
    }
    match hash.as_bytes().get(prefix_len) {
        Some(c) => charset.as_bytes().contains(c),
        None => false,
    }
}

/// A round's difficulty target bound to its chunk
#[derive(Debug, Clone)]
pub struct BlockValidator {
    target: DifficultyTarget,
    chunk: String,
}

impl BlockValidator {
    pub fn new(target: DifficultyTarget, chunk: &str) -> Self {
        Self {
            target,
            chunk: chunk.to_string(),
        }
    }

    pub fn chunk(&self) -> &str {
        &self.chunk
    }

    pub fn target(&self) -> &DifficultyTarget {
        &self.target
    }

    #[inline]
    pub fn is_valid(&self, block: &[u8]) -> bool {
        check_block_is_valid(
            block,
            &self.chunk,
            self.target.prefix_len,
            self.target.charset,
            self.target.has_fraction,
        )
    }

    #[inline]
    pub fn is_valid_hash(&self, hash: &str) -> bool {
        hash_meets_target(
            hash,
            &self.chunk,
            self.target.prefix_len,
            self.target.charset,
            self.target.has_fraction,
        )
    }
}
