// Queue Domain Model

use serde::{Deserialize, Serialize};

/// Queue identifier (opaque token, stable for the lifetime of a configuration entry)
pub type QueueId = String;

/// Default receive batch cap
pub const DEFAULT_MAX_MESSAGES: u32 = 10;

/// Default long-poll wait in seconds
pub const DEFAULT_WAIT_TIME_SECS: u64 = 20;

/// Queue descriptor resolved by the identity provider
///
/// One entry per configured queue. The `id` is the token listeners carry;
/// everything else is what a transport needs to poll the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Queue {
    pub id: QueueId,
    pub name: String,
    pub endpoint: String,

    /// Maximum messages per receive batch
    #[serde(default = "default_max_messages")]
    pub max_messages: u32,

    /// Long-poll wait time per receive call
    #[serde(default = "default_wait_time_secs")]
    pub wait_time_secs: u64,
}

fn default_max_messages() -> u32 {
    DEFAULT_MAX_MESSAGES
}

fn default_wait_time_secs() -> u64 {
    DEFAULT_WAIT_TIME_SECS
}

impl Queue {
    pub fn new(id: impl Into<String>, name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            endpoint: endpoint.into(),
            max_messages: DEFAULT_MAX_MESSAGES,
            wait_time_secs: DEFAULT_WAIT_TIME_SECS,
        }
    }
}
