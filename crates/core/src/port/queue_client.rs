// Queue Transport Port (Interface)
// Abstraction over the remote queue service a monitor polls

use crate::domain::{Queue, QueueMessage};
use async_trait::async_trait;
use thiserror::Error;

/// Transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Receive failed: {0}")]
    Receive(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("Queue not available: {0}")]
    Unavailable(String),
}

/// Queue transport trait
///
/// Implementations:
/// - MemoryQueueClient: in-process buffers (local mode, tests)
/// - a remote client would live in its own infra crate
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Receive the next batch, waiting up to `queue.wait_time_secs`
    ///
    /// Returns an empty batch when the wait expires with nothing pending.
    /// Received messages stay in flight until deleted.
    ///
    /// # Errors
    /// - TransportError::Unavailable if the queue cannot be reached
    /// - TransportError::Receive on transport failure
    async fn receive(&self, queue: &Queue) -> Result<Vec<QueueMessage>, TransportError>;

    /// Delete handled messages by receipt
    ///
    /// Unknown receipts are ignored; delivery is at-least-once.
    async fn delete(&self, queue: &Queue, receipts: &[String]) -> Result<(), TransportError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Outcome the mock serves for one `receive` call
    pub enum ScriptedReceive {
        Batch(Vec<QueueMessage>),
        Error(TransportError),
    }

    /// Mock transport serving scripted receive outcomes in order
    ///
    /// Once the script runs dry, `receive` returns empty batches after a
    /// short pause so polling loops under test do not spin.
    #[derive(Default)]
    pub struct MockQueueClient {
        script: Mutex<VecDeque<ScriptedReceive>>,
        receive_calls: Mutex<usize>,
        deleted: Mutex<Vec<String>>,
    }

    impl MockQueueClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_batch(&self, messages: Vec<QueueMessage>) {
            self.script
                .lock()
                .unwrap()
                .push_back(ScriptedReceive::Batch(messages));
        }

        pub fn push_error(&self, error: TransportError) {
            self.script
                .lock()
                .unwrap()
                .push_back(ScriptedReceive::Error(error));
        }

        pub fn receive_calls(&self) -> usize {
            *self.receive_calls.lock().unwrap()
        }

        pub fn deleted_receipts(&self) -> Vec<String> {
            self.deleted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueueClient for MockQueueClient {
        async fn receive(&self, _queue: &Queue) -> Result<Vec<QueueMessage>, TransportError> {
            *self.receive_calls.lock().unwrap() += 1;

            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(ScriptedReceive::Batch(messages)) => Ok(messages),
                Some(ScriptedReceive::Error(error)) => Err(error),
                None => {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok(Vec::new())
                }
            }
        }

        async fn delete(&self, _queue: &Queue, receipts: &[String]) -> Result<(), TransportError> {
            self.deleted.lock().unwrap().extend_from_slice(receipts);
            Ok(())
        }
    }
}
