// Log Listener - delivery surface for received batches

use tracing::info;
use vigil_core::domain::{QueueId, QueueMessage};
use vigil_core::port::QueueListener;

/// Listener that logs every delivered message
///
/// Stands in for the trigger wiring, which lives outside this engine.
pub struct LogListener {
    queue_id: QueueId,
}

impl LogListener {
    pub fn new(queue_id: impl Into<String>) -> Self {
        Self {
            queue_id: queue_id.into(),
        }
    }
}

impl QueueListener for LogListener {
    fn queue_id(&self) -> QueueId {
        self.queue_id.clone()
    }

    fn on_messages(&self, messages: &[QueueMessage]) {
        for message in messages {
            info!(
                queue_id = %self.queue_id,
                message_id = %message.id,
                received_at = message.received_at,
                body = %message.body,
                "Message received"
            );
        }
    }
}
