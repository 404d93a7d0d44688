// Monitor Factory Port (Interface)

use crate::domain::Queue;
use crate::port::QueueMonitor;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Constructs monitors bound to exactly one queue
///
/// The scheduler passes its runtime handle through so monitors spawn their
/// polling tasks on the shared runtime; the factory does not own the
/// runtime's lifecycle.
pub trait MonitorFactory: Send + Sync {
    fn create_monitor(&self, handle: &Handle, queue: Queue) -> Arc<dyn QueueMonitor>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::QueueId;
    use crate::port::monitor::mocks::MockQueueMonitor;
    use std::sync::Mutex;

    /// Factory producing one fresh `MockQueueMonitor` per call
    ///
    /// Every created monitor is retained so tests can assert against the
    /// exact instance the scheduler received.
    #[derive(Default)]
    pub struct MockMonitorFactory {
        created: Mutex<Vec<(QueueId, Arc<MockQueueMonitor>)>>,
    }

    impl MockMonitorFactory {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn create_calls(&self) -> usize {
            self.created.lock().unwrap().len()
        }

        /// Monitors created for one queue id, in creation order
        pub fn created_for(&self, queue_id: &str) -> Vec<Arc<MockQueueMonitor>> {
            self.created
                .lock()
                .unwrap()
                .iter()
                .filter(|(id, _)| id == queue_id)
                .map(|(_, monitor)| monitor.clone())
                .collect()
        }
    }

    impl MonitorFactory for MockMonitorFactory {
        fn create_monitor(&self, _handle: &Handle, queue: Queue) -> Arc<dyn QueueMonitor> {
            let monitor = Arc::new(MockQueueMonitor::new());
            self.created.lock().unwrap().push((queue.id, monitor.clone()));
            monitor
        }
    }
}
