// Reward address handling

mod address;

pub use address::{Address, AddressCodec, HexOrBase58Codec, KNOWN_ADDRESS_LENGTHS};
