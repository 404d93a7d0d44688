// In-Process Queue Transport (QueueClient adapter)

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;
use uuid::Uuid;
use vigil_core::domain::{Queue, QueueId, QueueMessage};
use vigil_core::port::{QueueClient, TransportError};

/// How often a waiting receive re-checks its buffer (25ms)
const RECEIVE_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Default)]
struct QueueState {
    pending: VecDeque<QueueMessage>,
    in_flight: HashMap<String, QueueMessage>,
}

/// In-process queue transport
///
/// Per-queue buffers with receive/in-flight/delete semantics: a received
/// message stays in flight until its receipt is deleted. Queues must be
/// registered before use; pushing to or polling an unknown queue is a
/// transport error, same as a remote queue that does not exist.
#[derive(Default)]
pub struct MemoryQueueClient {
    queues: Mutex<HashMap<QueueId, QueueState>>,
}

impl MemoryQueueClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the buffer for a queue; idempotent
    pub fn register_queue(&self, id: impl Into<String>) {
        self.lock_queues().entry(id.into()).or_default();
    }

    /// Enqueue a message body, assigning id, receipt and timestamp
    pub fn push(
        &self,
        queue_id: &str,
        body: impl Into<String>,
    ) -> Result<QueueMessage, TransportError> {
        let mut queues = self.lock_queues();
        let state = queues
            .get_mut(queue_id)
            .ok_or_else(|| TransportError::Unavailable(queue_id.to_string()))?;

        let message = QueueMessage::new(
            Uuid::new_v4().to_string(),
            Uuid::new_v4().to_string(),
            body,
            chrono::Utc::now().timestamp_millis(),
        );
        state.pending.push_back(message.clone());
        debug!(queue_id = %queue_id, message_id = %message.id, "Message enqueued");
        Ok(message)
    }

    pub fn pending_count(&self, queue_id: &str) -> usize {
        self.lock_queues()
            .get(queue_id)
            .map(|state| state.pending.len())
            .unwrap_or(0)
    }

    pub fn in_flight_count(&self, queue_id: &str) -> usize {
        self.lock_queues()
            .get(queue_id)
            .map(|state| state.in_flight.len())
            .unwrap_or(0)
    }

    fn lock_queues(&self) -> MutexGuard<'_, HashMap<QueueId, QueueState>> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl QueueClient for MemoryQueueClient {
    async fn receive(&self, queue: &Queue) -> Result<Vec<QueueMessage>, TransportError> {
        let deadline = Instant::now() + Duration::from_secs(queue.wait_time_secs);

        loop {
            {
                let mut queues = self.lock_queues();
                let state = queues
                    .get_mut(&queue.id)
                    .ok_or_else(|| TransportError::Unavailable(queue.id.clone()))?;

                if !state.pending.is_empty() {
                    let take = state.pending.len().min(queue.max_messages as usize);
                    let batch: Vec<QueueMessage> = state.pending.drain(..take).collect();
                    for message in &batch {
                        state.in_flight.insert(message.receipt.clone(), message.clone());
                    }
                    return Ok(batch);
                }
            }

            if Instant::now() >= deadline {
                return Ok(Vec::new());
            }
            sleep(RECEIVE_POLL_INTERVAL).await;
        }
    }

    async fn delete(&self, queue: &Queue, receipts: &[String]) -> Result<(), TransportError> {
        let mut queues = self.lock_queues();
        let state = queues
            .get_mut(&queue.id)
            .ok_or_else(|| TransportError::Unavailable(queue.id.clone()))?;

        for receipt in receipts {
            // unknown receipts are ignored: delivery is at-least-once
            state.in_flight.remove(receipt);
        }
        Ok(())
    }
}
