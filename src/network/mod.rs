// Node service interface and its HTTP implementation

mod message;
mod client;

pub use message::{LastBlock, MiningInfo, MiningInfoResponse, PushBlockRequest, PushBlockResponse};
pub use client::{HttpNodeClient, DEFAULT_NODE_URL};

/// Node call error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// Connection, timeout or other transport failure
    Transport(String),
    /// Non-success HTTP status
    Status(u16),
    /// Response body could not be decoded
    Decode(String),
    /// The node answered but reported failure
    Rejected(String),
}

impl std::fmt::Display for NodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            NodeError::Transport(e) => write!(f, "Transport error: {}", e),
            NodeError::Status(code) => write!(f, "Node returned HTTP {}", code),
            NodeError::Decode(e) => write!(f, "Malformed node response: {}", e),
            NodeError::Rejected(e) => write!(f, "Node rejected request: {}", e),
        }
    }
}

impl std::error::Error for NodeError {}

/// The remote ledger service a miner talks to
pub trait NodeService: Send + Sync {
    /// Current difficulty, chain tip and pending transactions
    fn get_mining_info(&self) -> Result<MiningInfo, NodeError>;

    /// Submit a mined block. `Ok(true)` means the node acknowledged it,
    /// `Ok(false)` that it answered without accepting.
    fn push_block(&self, block: &PushBlockRequest) -> Result<bool, NodeError>;
}
