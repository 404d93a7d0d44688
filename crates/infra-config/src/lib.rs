// Vigil Infrastructure - Configuration Adapters
// Implements: QueueProvider

pub mod registry;

pub use registry::FileQueueRegistry;
