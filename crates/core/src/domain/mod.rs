// Domain Layer - Pure business logic and entities

pub mod message;
pub mod queue;

// Re-exports
pub use message::QueueMessage;
pub use queue::{Queue, QueueId};
