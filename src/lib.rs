// uPow proof-of-work mining client
// Fetches mining info from a node, searches nonces in parallel, submits blocks.

pub mod core;
pub mod consensus;
pub mod mining;
pub mod network;
pub mod wallet;
pub mod cli;

// Re-exports for convenience
pub use core::{BlockTemplate, BlockTemplateBuilder, Hash256, TemplateError, merkle_root};
pub use consensus::{BlockValidator, DifficultyTarget, check_block_is_valid};
pub use mining::{MinerConfig, RoundOrchestrator, RoundOutcome, RoundPhase, WorkerRegistry};
pub use network::{HttpNodeClient, MiningInfo, NodeError, NodeService, PushBlockRequest};
pub use wallet::{Address, AddressCodec, HexOrBase58Codec};
pub use cli::{Cli, CliHandler};
