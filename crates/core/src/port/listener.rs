// Queue Listener Port (Interface)

use crate::domain::{QueueId, QueueMessage};

/// A registration record interested in one queue's messages
///
/// The queue id must stay constant for the listener's lifetime. Listener
/// identity is `Arc` pointer identity; the engine never compares listeners
/// by value.
pub trait QueueListener: Send + Sync {
    /// Identifier of the queue this listener wants messages from
    fn queue_id(&self) -> QueueId;

    /// Deliver a received batch
    ///
    /// Called from the monitor's polling task. Implementations should hand
    /// off quickly; a slow listener stalls delivery for every listener on
    /// the same queue.
    fn on_messages(&self, messages: &[QueueMessage]);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Listener that records every delivered batch
    pub struct RecordingListener {
        queue_id: QueueId,
        received: Mutex<Vec<Vec<QueueMessage>>>,
    }

    impl RecordingListener {
        pub fn new(queue_id: impl Into<String>) -> Self {
            Self {
                queue_id: queue_id.into(),
                received: Mutex::new(Vec::new()),
            }
        }

        pub fn batch_count(&self) -> usize {
            self.received.lock().unwrap().len()
        }

        pub fn message_count(&self) -> usize {
            self.received.lock().unwrap().iter().map(Vec::len).sum()
        }

        pub fn received_bodies(&self) -> Vec<String> {
            self.received
                .lock()
                .unwrap()
                .iter()
                .flatten()
                .map(|m| m.body.clone())
                .collect()
        }
    }

    impl QueueListener for RecordingListener {
        fn queue_id(&self) -> QueueId {
            self.queue_id.clone()
        }

        fn on_messages(&self, messages: &[QueueMessage]) {
            self.received.lock().unwrap().push(messages.to_vec());
        }
    }
}
