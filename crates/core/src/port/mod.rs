// Port Layer - Interfaces for external dependencies

pub mod listener;
pub mod monitor;
pub mod monitor_factory;
pub mod queue_client;
pub mod queue_provider;

// Re-exports
pub use listener::QueueListener;
pub use monitor::QueueMonitor;
pub use monitor_factory::MonitorFactory;
pub use queue_client::{QueueClient, TransportError};
pub use queue_provider::QueueProvider;
