// Mining engine: worker pool, liveness registry and round orchestration

mod registry;
mod worker;
mod orchestrator;

#[cfg(test)]
pub(crate) mod testing;

pub use registry::{LivenessHandle, WorkerRecord, WorkerRegistry};
pub use worker::{NonceRange, RoundContext, Worker, WorkerEvent, WorkerOutcome};
pub use orchestrator::{RoundOrchestrator, RoundOutcome, RoundPhase};

use crate::network::DEFAULT_NODE_URL;
use crate::wallet::Address;
use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_secs(90);
pub const DEFAULT_ROUND_TIMEOUT: Duration = Duration::from_secs(180);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_REPORT_INTERVAL: u64 = 5_000_000;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Miner configuration
#[derive(Debug, Clone)]
pub struct MinerConfig {
    /// Address that receives the block reward
    pub address: Address,
    /// Number of worker threads, and the nonce stride
    pub workers: usize,
    /// Node API base URL
    pub node_url: String,
    /// A worker gives up on its partition once the round is this old
    pub stall_timeout: Duration,
    /// All workers are stopped once the round is this old
    pub round_timeout: Duration,
    /// How often the orchestrator wakes up while waiting on workers
    pub poll_interval: Duration,
    /// Attempts between throughput reports (and stall checks)
    pub report_interval: u64,
    /// Pause before the next round after a failed fetch or bad template
    pub retry_delay: Duration,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            address: Address::new(""),
            workers: DEFAULT_WORKERS,
            node_url: DEFAULT_NODE_URL.to_string(),
            stall_timeout: DEFAULT_STALL_TIMEOUT,
            round_timeout: DEFAULT_ROUND_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            report_interval: DEFAULT_REPORT_INTERVAL,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl MinerConfig {
    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Address::new(address);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_node_url(mut self, url: &str) -> Self {
        self.node_url = url.to_string();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Worker count must be at least 1".to_string());
        }
        if self.workers > u32::MAX as usize {
            return Err(format!("Worker count {} exceeds the nonce space", self.workers));
        }
        if self.report_interval == 0 {
            return Err("Report interval must be at least 1".to_string());
        }
        if self.poll_interval.is_zero() {
            return Err("Poll interval must be non-zero".to_string());
        }
        Ok(())
    }
}
