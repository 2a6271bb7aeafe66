// Reward address decoding

use serde::{Deserialize, Serialize};

/// Address lengths the node understands: raw key (32), compact point (33), full point (64)
pub const KNOWN_ADDRESS_LENGTHS: [usize; 3] = [32, 33, 64];

/// Mining reward address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    pub fn new(address: &str) -> Self {
        Self(address.trim().to_string())
    }

    /// Get address string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw bytes through the given codec
    pub fn to_bytes<C: AddressCodec + ?Sized>(&self, codec: &C) -> Result<Vec<u8>, String> {
        let bytes = codec.decode(&self.0)?;
        if !KNOWN_ADDRESS_LENGTHS.contains(&bytes.len()) {
            log::warn!(
                "Address {} decodes to {} bytes, expected one of {:?}",
                self.0,
                bytes.len(),
                KNOWN_ADDRESS_LENGTHS
            );
        }
        Ok(bytes)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps an address string to the bytes placed in the block header
pub trait AddressCodec {
    fn decode(&self, address: &str) -> Result<Vec<u8>, String>;
}

/// Hex when the string is valid hex, base58 otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct HexOrBase58Codec;

impl AddressCodec for HexOrBase58Codec {
    fn decode(&self, address: &str) -> Result<Vec<u8>, String> {
        if address.is_empty() {
            return Err("Empty address".to_string());
        }
        if let Ok(bytes) = hex::decode(address) {
            return Ok(bytes);
        }
        bs58::decode(address)
            .into_vec()
            .map_err(|e| format!("Invalid address {}: {}", address, e))
    }
}
