// Queue Message Domain Model

use serde::{Deserialize, Serialize};

/// A message received from a queue
///
/// The body stays an opaque string; interpreting it belongs to the listener
/// side, not to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    /// Transport-assigned message id
    pub id: String,

    /// Deletion handle for this receive of the message
    pub receipt: String,

    /// Opaque message payload
    pub body: String,

    /// Receive timestamp in epoch ms
    pub received_at: i64,
}

impl QueueMessage {
    pub fn new(
        id: impl Into<String>,
        receipt: impl Into<String>,
        body: impl Into<String>,
        received_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            receipt: receipt.into(),
            body: body.into(),
            received_at,
        }
    }
}
