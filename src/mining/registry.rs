// Per-round worker liveness registry

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;

/// Liveness entry for one worker of one round
#[derive(Debug, Clone, Copy)]
pub struct WorkerRecord {
    pub id: usize,
    pub alive: bool,
    pub started_at: Instant,
}

/// Liveness map shared between the orchestrator and its workers.
///
/// A registry lives for exactly one round. Only the orchestrator writes to
/// it, and the only write after registration is `alive: true -> false`.
/// Workers get a [`LivenessHandle`], which can read its own entry and nothing else.
#[derive(Debug, Clone, Default)]
pub struct WorkerRegistry {
    records: Arc<DashMap<usize, WorkerRecord>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a live record for `id` and return the worker's read handle
    pub(crate) fn register(&self, id: usize) -> LivenessHandle {
        self.records.insert(
            id,
            WorkerRecord {
                id,
                alive: true,
                started_at: Instant::now(),
            },
        );
        LivenessHandle {
            registry: self.clone(),
            id,
        }
    }

    /// Mark one worker stopped
    pub(crate) fn retire(&self, id: usize) {
        if let Some(mut record) = self.records.get_mut(&id) {
            record.alive = false;
        }
    }

    /// Mark every worker stopped
    pub(crate) fn stop_all(&self) {
        for mut record in self.records.iter_mut() {
            record.alive = false;
        }
    }

    /// Unknown ids read as stopped
    pub fn is_alive(&self, id: usize) -> bool {
        self.records.get(&id).map(|r| r.alive).unwrap_or(false)
    }

    pub fn any_alive(&self) -> bool {
        self.records.iter().any(|r| r.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.records.iter().filter(|r| r.alive).count()
    }

    pub fn record(&self, id: usize) -> Option<WorkerRecord> {
        self.records.get(&id).map(|r| *r)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A worker's read-only view of its own record
#[derive(Debug, Clone)]
pub struct LivenessHandle {
    registry: WorkerRegistry,
    id: usize,
}

impl LivenessHandle {
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.registry.is_alive(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_register_and_retire() {
        let registry = WorkerRegistry::new();
        let handle = registry.register(3);

        assert_eq!(handle.id(), 3);
        assert!(handle.is_alive());
        assert_eq!(registry.record(3).map(|r| r.id), Some(3));

        registry.retire(3);
        assert!(!handle.is_alive());
        assert!(!registry.any_alive());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_worker_is_not_alive() {
        let registry = WorkerRegistry::new();
        assert!(!registry.is_alive(0));
        assert!(registry.is_empty());
        registry.retire(0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_stop_all() {
        let registry = WorkerRegistry::new();
        let handles: Vec<_> = (0..4).map(|id| registry.register(id)).collect();
        assert_eq!(registry.alive_count(), 4);

        registry.retire(1);
        assert_eq!(registry.alive_count(), 3);
        assert!(registry.any_alive());

        registry.stop_all();
        assert_eq!(registry.alive_count(), 0);
        assert!(handles.iter().all(|h| !h.is_alive()));
    }

    #[test]
    fn test_stop_is_seen_across_threads() {
        let registry = WorkerRegistry::new();
        let handle = registry.register(0);

        let spinner = thread::spawn(move || {
            let mut spins = 0u64;
            while handle.is_alive() {
                spins += 1;
                thread::yield_now();
            }
            spins
        });

        thread::sleep(std::time::Duration::from_millis(10));
        registry.stop_all();
        spinner.join().unwrap();
        assert!(!registry.is_alive(0));
    }

    #[test]
    fn test_separate_rounds_do_not_share_records() {
        let first = WorkerRegistry::new();
        first.register(0);
        first.stop_all();

        let second = WorkerRegistry::new();
        let handle = second.register(0);
        assert!(handle.is_alive());
        assert!(!first.is_alive(0));
    }
}
