// Nonce search worker

use crate::consensus::BlockValidator;
use crate::core::BlockTemplate;
use crate::mining::LivenessHandle;
use crate::network::{NodeService, PushBlockRequest};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

/// Nonces `offset, offset + stride, offset + 2*stride, ...` up to `u32::MAX`.
/// Offsets `0..stride` partition the nonce space without overlap.
#[derive(Debug, Clone)]
pub struct NonceRange {
    next: Option<u32>,
    stride: u32,
}

impl NonceRange {
    pub fn new(offset: u32, stride: u32) -> Self {
        Self {
            next: Some(offset),
            stride: stride.max(1),
        }
    }
}

impl Iterator for NonceRange {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let current = self.next?;
        self.next = current.checked_add(self.stride);
        Some(current)
    }
}

/// Everything the workers of one round share
#[derive(Debug)]
pub struct RoundContext {
    pub template: BlockTemplate,
    pub validator: BlockValidator,
    pub transactions: Vec<String>,
    pub block_no: u64,
    pub started_at: Instant,
    pub pool_size: usize,
    pub stall_timeout: Duration,
    pub report_interval: u64,
}

/// How a worker's search ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// A valid block was found and handed to the node
    Found { nonce: u32, accepted: bool },
    /// Stall budget spent, or partition exhausted
    Stalled { attempts: u64 },
    /// The orchestrator stopped this worker
    Cancelled,
}

/// Sent to the orchestrator when a worker stops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerEvent {
    pub id: usize,
    pub outcome: WorkerOutcome,
}

/// Searches one nonce partition of a round
pub struct Worker {
    liveness: LivenessHandle,
    round: Arc<RoundContext>,
    node: Arc<dyn NodeService>,
    events: Sender<WorkerEvent>,
}

impl Worker {
    pub fn new(
        liveness: LivenessHandle,
        round: Arc<RoundContext>,
        node: Arc<dyn NodeService>,
        events: Sender<WorkerEvent>,
    ) -> Self {
        Self {
            liveness,
            round,
            node,
            events,
        }
    }

    pub fn id(&self) -> usize {
        self.liveness.id()
    }

    /// Run the search and report the outcome to the orchestrator
    pub fn run(self) -> WorkerOutcome {
        let outcome = self.search();
        log::debug!("Worker {} finished: {:?}", self.id() + 1, outcome);

        // the receiver is gone only if the orchestrator already moved on
        let _ = self.events.send(WorkerEvent {
            id: self.id(),
            outcome: outcome.clone(),
        });
        outcome
    }

    fn search(&self) -> WorkerOutcome {
        let round = &*self.round;
        let id = self.id();
        let mut candidate = Vec::with_capacity(round.template.nonce_offset() + 4);
        let mut attempts = 0u64;

        for nonce in NonceRange::new(id as u32, round.pool_size as u32) {
            if !self.liveness.is_alive() {
                return WorkerOutcome::Cancelled;
            }

            round.template.write_candidate(nonce, &mut candidate);
            if round.validator.is_valid(&candidate) {
                return self.submit(nonce, &candidate);
            }

            attempts += 1;
            if attempts % round.report_interval == 0 {
                let elapsed = round.started_at.elapsed();
                let rate = attempts as f64 / elapsed.as_secs_f64().max(0.001);
                log::info!("Worker {}: {}k hash/s", id + 1, (rate / 1000.0) as u64);

                if elapsed > round.stall_timeout {
                    return WorkerOutcome::Stalled { attempts };
                }
            }
        }

        log::debug!("Worker {} exhausted its nonce partition", id + 1);
        WorkerOutcome::Stalled { attempts }
    }

    fn submit(&self, nonce: u32, candidate: &[u8]) -> WorkerOutcome {
        // a sibling may have won while this candidate was being checked
        if !self.liveness.is_alive() {
            return WorkerOutcome::Cancelled;
        }

        let block_content = hex::encode(candidate);
        log::info!("{}", block_content);

        let request = PushBlockRequest {
            block_content,
            txs: self.round.transactions.clone(),
            block_no: self.round.block_no,
        };

        let accepted = match self.node.push_block(&request) {
            Ok(true) => {
                log::info!("BLOCK MINED");
                true
            }
            Ok(false) => {
                log::warn!("Block {} was not accepted by the node", request.block_no);
                false
            }
            Err(e) => {
                log::warn!("Failed to submit block {}: {}", request.block_no, e);
                false
            }
        };

        WorkerOutcome::Found { nonce, accepted }
    }
}
