// Mining round orchestration
//
// Idle -> Running -> Draining -> Idle, forever. Each round fetches fresh
// mining info, spawns the worker pool over a fresh registry, waits for a
// winner, a full stall or the round timeout, then throws everything away.

use crate::consensus::{BlockValidator, DifficultyTarget};
use crate::core::{resolve_previous_hash, BlockTemplateBuilder, TemplateError};
use crate::mining::{MinerConfig, RoundContext, Worker, WorkerEvent, WorkerOutcome, WorkerRegistry};
use crate::network::{MiningInfo, NodeError, NodeService};
use crate::wallet::{AddressCodec, HexOrBase58Codec};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Between rounds
    Idle,
    /// Workers are searching
    Running,
    /// Workers have been told to stop
    Draining,
}

/// Result of one round
#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    /// A worker found a block and submitted it
    Mined { block_no: u64, accepted: bool },
    /// Every worker stalled or exhausted its partition
    Stalled,
    /// The round timeout hit before any worker found a block
    TimedOut,
    /// Mining info could not be fetched
    FetchFailed(NodeError),
    /// Mining info could not be turned into a template
    TemplateFailed(TemplateError),
}

/// Runs mining rounds against a node
pub struct RoundOrchestrator {
    config: MinerConfig,
    address: Vec<u8>,
    node: Arc<dyn NodeService>,
    phase: RoundPhase,
    rounds: u64,
}

impl RoundOrchestrator {
    /// Decode the configured address with the default codec
    pub fn new(config: MinerConfig, node: Arc<dyn NodeService>) -> Result<Self, String> {
        Self::with_codec(config, node, &HexOrBase58Codec)
    }

    pub fn with_codec<C: AddressCodec + ?Sized>(
        config: MinerConfig,
        node: Arc<dyn NodeService>,
        codec: &C,
    ) -> Result<Self, String> {
        config.validate()?;
        let address = config.address.to_bytes(codec)?;

        Ok(Self {
            config,
            address,
            node,
            phase: RoundPhase::Idle,
            rounds: 0,
        })
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Rounds completed so far
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Derive target, chunk and template for a round
    pub fn prepare_round(&self, info: &MiningInfo) -> Result<RoundContext, TemplateError> {
        let target = DifficultyTarget::from_difficulty(info.difficulty);
        let previous = resolve_previous_hash(&info.last_block.hash);
        let chunk = target.chunk(&previous)?;

        let template = BlockTemplateBuilder::new()
            .previous_hash(&previous)
            .address(&self.address)
            .transactions(&info.pending_transactions_hashes)
            .difficulty(info.difficulty)
            .build()?;

        Ok(RoundContext {
            validator: BlockValidator::new(target, chunk),
            template,
            transactions: info.pending_transactions_hashes.clone(),
            block_no: info.next_block_no(),
            started_at: Instant::now(),
            pool_size: self.config.workers,
            stall_timeout: self.config.stall_timeout,
            report_interval: self.config.report_interval,
        })
    }

    /// Run rounds back to back. `None` runs forever.
    pub fn run(&mut self, max_rounds: Option<u64>) {
        while max_rounds.is_none_or(|max| self.rounds < max) {
            match self.run_round() {
                RoundOutcome::Mined { block_no, accepted } => {
                    log::info!("Round ended: block {} submitted (accepted: {})", block_no, accepted);
                }
                RoundOutcome::Stalled => {
                    log::info!("Round ended: all workers stalled, refreshing mining info");
                }
                RoundOutcome::TimedOut => {
                    log::info!("Round ended: timed out after {:?}", self.config.round_timeout);
                }
                RoundOutcome::FetchFailed(e) => {
                    log::error!("Failed to fetch mining info: {}", e);
                    thread::sleep(self.config.retry_delay);
                }
                RoundOutcome::TemplateFailed(e) => {
                    log::error!("Failed to build block template: {}", e);
                    thread::sleep(self.config.retry_delay);
                }
            }
        }
    }

    /// One full round: fetch, search, drain
    pub fn run_round(&mut self) -> RoundOutcome {
        self.phase = RoundPhase::Running;
        let outcome = self.mine_once();
        self.phase = RoundPhase::Idle;
        self.rounds += 1;
        outcome
    }

    fn mine_once(&mut self) -> RoundOutcome {
        log::info!("Starting {} workers", self.config.workers);

        let info = match self.node.get_mining_info() {
            Ok(info) => info,
            Err(e) => return RoundOutcome::FetchFailed(e),
        };
        let round = match self.prepare_round(&info) {
            Ok(round) => Arc::new(round),
            Err(e) => return RoundOutcome::TemplateFailed(e),
        };

        log::info!("Difficulty: {}", info.difficulty);
        log::info!("Block number: {}", info.last_block.id);
        log::info!("Confirming {} transactions", info.pending_transactions_hashes.len());

        let registry = WorkerRegistry::new();
        let (events_tx, events_rx) = mpsc::channel();
        let mut handles: Vec<JoinHandle<WorkerOutcome>> = Vec::with_capacity(self.config.workers);

        for id in 0..self.config.workers {
            log::debug!("Starting worker n.{}", id + 1);
            let worker = Worker::new(
                registry.register(id),
                round.clone(),
                self.node.clone(),
                events_tx.clone(),
            );
            match thread::Builder::new()
                .name(format!("worker-{}", id + 1))
                .spawn(move || worker.run())
            {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    log::error!("Failed to spawn worker {}: {}", id + 1, e);
                    registry.retire(id);
                }
            }
        }
        drop(events_tx);

        let mut mined = None;
        let mut timed_out = false;

        while registry.any_alive() {
            match events_rx.recv_timeout(self.config.poll_interval) {
                Ok(WorkerEvent { id, outcome }) => {
                    registry.retire(id);
                    if let WorkerOutcome::Found { accepted, .. } = outcome {
                        self.phase = RoundPhase::Draining;
                        registry.stop_all();
                        mined.get_or_insert(accepted);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if round.started_at.elapsed() > self.config.round_timeout {
                self.phase = RoundPhase::Draining;
                registry.stop_all();
                timed_out = true;
            }
        }

        self.phase = RoundPhase::Draining;
        registry.stop_all();
        for handle in handles {
            if let Ok(WorkerOutcome::Found { accepted, .. }) = handle.join() {
                // a worker can finish its submission after the wait loop has exited
                mined.get_or_insert(accepted);
            }
        }

        match (mined, timed_out) {
            (Some(accepted), _) => RoundOutcome::Mined {
                block_no: round.block_no,
                accepted,
            },
            (None, true) => RoundOutcome::TimedOut,
            (None, false) => RoundOutcome::Stalled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mining::testing::MockNode;
    use crate::network::LastBlock;
    use std::time::Duration;

    const ADDRESS: &str = "Dvhg47J4J2ZgAujAZEJh4PihbWqbyR5BeUKJccNcs7QjC";

    fn config(workers: usize) -> MinerConfig {
        MinerConfig {
            poll_interval: Duration::from_millis(10),
            retry_delay: Duration::from_millis(1),
            ..MinerConfig::default()
        }
        .with_address(ADDRESS)
        .with_workers(workers)
    }

    fn orchestrator(config: MinerConfig, node: &Arc<MockNode>) -> RoundOrchestrator {
        RoundOrchestrator::new(config, node.clone()).unwrap()
    }

    #[test]
    fn test_prepare_round_uses_mining_info() {
        let node = Arc::new(MockNode::new(MiningInfo {
            difficulty: 2.5,
            last_block: LastBlock {
                hash: "ab".repeat(32),
                id: 99,
            },
            pending_transactions_hashes: vec!["0011".to_string()],
        }));
        let orchestrator = orchestrator(config(3), &node);

        let info = node.get_mining_info().unwrap();
        let round = orchestrator.prepare_round(&info).unwrap();

        assert_eq!(round.block_no, 100);
        assert_eq!(round.pool_size, 3);
        assert_eq!(round.validator.chunk(), "ab");
        assert_eq!(round.validator.target().charset, "01234567");
        assert_eq!(round.transactions, vec!["0011"]);
        // compact base58 address: marker first, previous hash at offset 1
        assert!(round.template.has_format_marker());
        assert_eq!(round.template.prefix()[0], 2);
        assert_eq!(&round.template.prefix()[1..33], &[0xab; 32]);
    }

    #[test]
    fn test_prepare_round_genesis_fallback() {
        let node = Arc::new(MockNode::with_difficulty(4.0));
        let orchestrator = orchestrator(config(1), &node);

        let round = orchestrator.prepare_round(&MiningInfo::default()).unwrap();
        assert_eq!(round.block_no, 1);
        assert_eq!(&round.template.prefix()[1..5], &30_062_005u32.to_le_bytes());
    }

    #[test]
    fn test_round_mines_and_submits() {
        let node = Arc::new(MockNode::with_difficulty(0.0));
        let mut orchestrator = orchestrator(config(1), &node);

        let outcome = orchestrator.run_round();
        assert_eq!(outcome, RoundOutcome::Mined { block_no: 1, accepted: true });
        assert_eq!(orchestrator.phase(), RoundPhase::Idle);
        assert_eq!(node.fetches(), 1);
        assert_eq!(node.pushed().len(), 1);
    }

    #[test]
    fn test_round_with_pool_stops_after_first_block() {
        let node = Arc::new(MockNode::with_difficulty(0.0));
        let mut orchestrator = orchestrator(config(4), &node);

        let outcome = orchestrator.run_round();
        assert!(matches!(outcome, RoundOutcome::Mined { accepted: true, .. }));
        // each worker submits at most once, however many raced to the first nonce
        let pushed = node.pushed().len();
        assert!((1..=4).contains(&pushed));
    }

    #[test]
    fn test_rejected_block_still_ends_round() {
        let node = Arc::new(MockNode::with_difficulty(0.0).rejecting());
        let mut orchestrator = orchestrator(config(1), &node);

        assert_eq!(
            orchestrator.run_round(),
            RoundOutcome::Mined { block_no: 1, accepted: false }
        );
    }

    #[test]
    fn test_round_times_out() {
        let node = Arc::new(MockNode::with_difficulty(64.0));
        let config = MinerConfig {
            round_timeout: Duration::from_millis(100),
            ..config(2)
        };
        let mut orchestrator = orchestrator(config, &node);

        let started = Instant::now();
        assert_eq!(orchestrator.run_round(), RoundOutcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert!(node.pushed().is_empty());
        assert_eq!(orchestrator.phase(), RoundPhase::Idle);
    }

    #[test]
    fn test_all_workers_stalled_ends_round_early() {
        let node = Arc::new(MockNode::with_difficulty(64.0));
        let config = MinerConfig {
            stall_timeout: Duration::ZERO,
            report_interval: 1_000,
            ..config(3)
        };
        let mut orchestrator = orchestrator(config, &node);

        assert_eq!(orchestrator.run_round(), RoundOutcome::Stalled);
        assert!(node.pushed().is_empty());
    }

    #[test]
    fn test_each_round_refetches_mining_info() {
        let node = Arc::new(MockNode::with_difficulty(64.0));
        let config = MinerConfig {
            round_timeout: Duration::from_millis(30),
            ..config(2)
        };
        let mut orchestrator = orchestrator(config, &node);

        orchestrator.run(Some(3));
        assert_eq!(orchestrator.rounds(), 3);
        assert_eq!(node.fetches(), 3);
        assert_eq!(orchestrator.phase(), RoundPhase::Idle);
    }

    #[test]
    fn test_fetch_failure_is_reported() {
        let node = Arc::new(
            MockNode::with_difficulty(0.0).failing(NodeError::Transport("refused".to_string())),
        );
        let mut orchestrator = orchestrator(config(2), &node);

        assert_eq!(
            orchestrator.run_round(),
            RoundOutcome::FetchFailed(NodeError::Transport("refused".to_string()))
        );
        assert!(node.pushed().is_empty());

        orchestrator.run(Some(3));
        assert_eq!(node.fetches(), 3);
    }

    #[test]
    fn test_bad_previous_hash_is_template_failure() {
        let node = Arc::new(MockNode::new(MiningInfo {
            difficulty: 1.0,
            last_block: LastBlock {
                hash: "zz".to_string(),
                id: 5,
            },
            pending_transactions_hashes: vec![],
        }));
        let mut orchestrator = orchestrator(config(1), &node);

        assert!(matches!(orchestrator.run_round(), RoundOutcome::TemplateFailed(_)));
    }

    #[test]
    fn test_invalid_address_rejected() {
        let node: Arc<dyn NodeService> = Arc::new(MockNode::with_difficulty(1.0));
        let config = MinerConfig::default().with_address("0l0l0");
        assert!(RoundOrchestrator::new(config, node).is_err());
    }
}
