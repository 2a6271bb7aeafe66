// Block template assembly

use crate::core::{merkle_root, Hash256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seed written into the first four bytes of the synthetic genesis hash
pub const GENESIS_SEED: u32 = 30_06_2005;

/// Address encodings of this length are compact public keys and get a format marker
pub const COMPACT_ADDRESS_LEN: usize = 33;

/// Marker byte placed ahead of the whole prefix for compact addresses
pub const ADDRESS_FORMAT_MARKER: u8 = 2;

/// Template assembly error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A hex field from the node could not be decoded
    InvalidHex { field: &'static str, reason: String },
    /// A decoded field has the wrong size
    InvalidLength { field: &'static str, expected: usize, got: usize },
    /// The difficulty asks for a longer chunk than the previous hash has
    PrefixTooLong { required: usize, available: usize },
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TemplateError::InvalidHex { field, reason } => {
                write!(f, "Invalid hex in {}: {}", field, reason)
            }
            TemplateError::InvalidLength { field, expected, got } => {
                write!(f, "Invalid {} length: expected {}, got {}", field, expected, got)
            }
            TemplateError::PrefixTooLong { required, available } => {
                write!(f, "Difficulty needs a {}-char chunk but the previous hash has {}", required, available)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Deterministic stand-in for the previous hash before the first block:
/// `GENESIS_SEED` little-endian in the first four bytes, zeros after.
pub fn genesis_hash() -> Hash256 {
    let mut bytes = [0u8; 32];
    bytes[..4].copy_from_slice(&GENESIS_SEED.to_le_bytes());
    Hash256::new(bytes)
}

/// The previous hash as the node reported it, or the genesis hash when empty
pub fn resolve_previous_hash(last_block_hash: &str) -> String {
    if last_block_hash.is_empty() {
        genesis_hash().to_hex()
    } else {
        last_block_hash.to_string()
    }
}

/// Current UNIX time truncated to the 4-byte header field
pub fn unix_timestamp() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

/// Header bytes shared by every candidate of a round.
/// A candidate is `prefix || nonce.to_le_bytes()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplate {
    prefix: Vec<u8>,
    format_marker: bool,
}

impl BlockTemplate {
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Offset at which the 4-byte nonce is appended
    pub fn nonce_offset(&self) -> usize {
        self.prefix.len()
    }

    /// Whether the prefix starts with the compact-address format marker
    pub fn has_format_marker(&self) -> bool {
        self.format_marker
    }

    /// Write the candidate for `nonce` into `buf`, reusing its allocation
    #[inline]
    pub fn write_candidate(&self, nonce: u32, buf: &mut Vec<u8>) {
        buf.clear();
        buf.extend_from_slice(&self.prefix);
        buf.extend_from_slice(&nonce.to_le_bytes());
    }

    pub fn candidate(&self, nonce: u32) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.prefix.len() + 4);
        self.write_candidate(nonce, &mut buf);
        buf
    }
}

/// Builder for the per-round block template
#[derive(Debug, Default)]
pub struct BlockTemplateBuilder {
    previous_hash: String,
    address: Vec<u8>,
    transactions: Vec<String>,
    timestamp: Option<u32>,
    difficulty: f64,
}

impl BlockTemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previous block hash as hex; empty means "no block yet" (genesis fallback)
    pub fn previous_hash(mut self, hash: &str) -> Self {
        self.previous_hash = hash.to_string();
        self
    }

    /// Decoded miner address bytes
    pub fn address(mut self, bytes: &[u8]) -> Self {
        self.address = bytes.to_vec();
        self
    }

    /// Pending transaction hashes, in node order
    pub fn transactions(mut self, txs: &[String]) -> Self {
        self.transactions = txs.to_vec();
        self
    }

    /// Fixed timestamp; defaults to the current time at `build`
    pub fn timestamp(mut self, ts: u32) -> Self {
        self.timestamp = Some(ts);
        self
    }

    pub fn difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Assemble `prev_hash || address || merkle_root || timestamp || difficulty*10`,
    /// with the format marker in front when the address is compact.
    pub fn build(self) -> Result<BlockTemplate, TemplateError> {
        let previous_hex = resolve_previous_hash(&self.previous_hash);
        let previous = hex::decode(&previous_hex).map_err(|e| TemplateError::InvalidHex {
            field: "previous hash",
            reason: e.to_string(),
        })?;
        if previous.len() != 32 {
            return Err(TemplateError::InvalidLength {
                field: "previous hash",
                expected: 32,
                got: previous.len(),
            });
        }

        let root = merkle_root(&self.transactions)?;
        let timestamp = self.timestamp.unwrap_or_else(unix_timestamp);
        let encoded_difficulty = (self.difficulty * 10.0).round() as u16;

        let compact = self.address.len() == COMPACT_ADDRESS_LEN;
        let mut prefix = Vec::with_capacity(1 + 32 + self.address.len() + 32 + 4 + 2);
        if compact {
            prefix.push(ADDRESS_FORMAT_MARKER);
        }
        prefix.extend_from_slice(&previous);
        prefix.extend_from_slice(&self.address);
        prefix.extend_from_slice(root.as_bytes());
        prefix.extend_from_slice(&timestamp.to_le_bytes());
        prefix.extend_from_slice(&encoded_difficulty.to_le_bytes());

        Ok(BlockTemplate { prefix, format_marker: compact })
    }
}
