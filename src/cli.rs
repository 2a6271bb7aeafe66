// CLI arguments

use clap::Parser;
use crate::mining::{
    MinerConfig, RoundOrchestrator, DEFAULT_REPORT_INTERVAL, DEFAULT_WORKERS,
};
use crate::network::{HttpNodeClient, DEFAULT_NODE_URL};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "upow-miner")]
#[command(about = "Proof-of-work CPU miner for uPow nodes", long_about = None)]
pub struct Cli {
    /// Address that'll receive mining rewards
    #[arg(long)]
    pub address: String,

    /// Number of concurrent workers to spawn
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Node to which we'll retrieve mining info
    #[arg(long, default_value = DEFAULT_NODE_URL)]
    pub node: String,

    /// Seconds a worker searches before giving up on the round
    #[arg(long, default_value_t = 90)]
    pub stall_timeout: u64,

    /// Seconds before all workers are stopped and the round restarts
    #[arg(long, default_value_t = 180)]
    pub round_timeout: u64,

    /// Attempts between hash rate reports
    #[arg(long, default_value_t = DEFAULT_REPORT_INTERVAL)]
    pub report_interval: u64,

    /// Stop after this many rounds (runs forever if omitted)
    #[arg(long)]
    pub rounds: Option<u64>,
}

impl Cli {
    /// Build the miner configuration from the parsed arguments
    pub fn config(&self) -> MinerConfig {
        MinerConfig {
            stall_timeout: Duration::from_secs(self.stall_timeout),
            round_timeout: Duration::from_secs(self.round_timeout),
            report_interval: self.report_interval,
            ..MinerConfig::default()
        }
        .with_address(&self.address)
        .with_workers(self.workers)
        .with_node_url(&self.node)
    }
}

/// CLI handler
pub struct CliHandler {
    orchestrator: RoundOrchestrator,
}

impl CliHandler {
    /// Connect the node client and decode the reward address
    pub fn new(cli: &Cli) -> Result<Self, String> {
        let config = cli.config();
        let node = HttpNodeClient::new(&config.node_url).map_err(|e| e.to_string())?;

        log::info!("Mining to {} via {}", config.address, node.base_url());

        let orchestrator = RoundOrchestrator::new(config, Arc::new(node))?;
        Ok(Self { orchestrator })
    }

    /// Mine until `rounds` rounds have run, or forever
    pub fn run(&mut self, rounds: Option<u64>) {
        self.orchestrator.run(rounds);
    }
}
