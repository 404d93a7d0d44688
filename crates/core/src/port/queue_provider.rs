// Queue Identity Provider Port (Interface)

use crate::domain::{Queue, QueueId};

/// Resolves queue identifiers against the current external configuration
///
/// `None` means the identifier does not (or no longer does) name a configured
/// queue. That is an expected, recoverable condition, never an error.
pub trait QueueProvider: Send + Sync {
    fn resolve(&self, id: &QueueId) -> Option<Queue>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock provider over a mutable queue set, counting resolves per id
    #[derive(Default)]
    pub struct MockQueueProvider {
        queues: Mutex<HashMap<QueueId, Queue>>,
        resolve_calls: Mutex<HashMap<QueueId, usize>>,
    }

    impl MockQueueProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_queue(self, queue: Queue) -> Self {
            self.insert(queue);
            self
        }

        pub fn insert(&self, queue: Queue) {
            self.queues.lock().unwrap().insert(queue.id.clone(), queue);
        }

        /// Drop an entry, simulating the queue disappearing from configuration
        pub fn remove(&self, id: &str) {
            self.queues.lock().unwrap().remove(id);
        }

        pub fn resolve_calls(&self, id: &str) -> usize {
            self.resolve_calls
                .lock()
                .unwrap()
                .get(id)
                .copied()
                .unwrap_or(0)
        }
    }

    impl QueueProvider for MockQueueProvider {
        fn resolve(&self, id: &QueueId) -> Option<Queue> {
            *self
                .resolve_calls
                .lock()
                .unwrap()
                .entry(id.clone())
                .or_insert(0) += 1;
            self.queues.lock().unwrap().get(id).cloned()
        }
    }
}
