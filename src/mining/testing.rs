// In-memory node for engine tests

use crate::network::{MiningInfo, NodeError, NodeService, PushBlockRequest};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves fixed mining info and records every submitted block
pub(crate) struct MockNode {
    info: MiningInfo,
    accept: bool,
    fetch_error: Option<NodeError>,
    fetches: AtomicUsize,
    pushed: Mutex<Vec<PushBlockRequest>>,
}

impl MockNode {
    pub(crate) fn new(info: MiningInfo) -> Self {
        Self {
            info,
            accept: true,
            fetch_error: None,
            fetches: AtomicUsize::new(0),
            pushed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_difficulty(difficulty: f64) -> Self {
        Self::new(MiningInfo {
            difficulty,
            ..Default::default()
        })
    }

    pub(crate) fn rejecting(mut self) -> Self {
        self.accept = false;
        self
    }

    pub(crate) fn failing(mut self, error: NodeError) -> Self {
        self.fetch_error = Some(error);
        self
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn pushed(&self) -> Vec<PushBlockRequest> {
        self.pushed.lock().unwrap().clone()
    }
}

impl NodeService for MockNode {
    fn get_mining_info(&self) -> Result<MiningInfo, NodeError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.fetch_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.info.clone()),
        }
    }

    fn push_block(&self, block: &PushBlockRequest) -> Result<bool, NodeError> {
        self.pushed.lock().unwrap().push(block.clone());
        Ok(self.accept)
    }
}
