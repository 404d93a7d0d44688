// Queue Monitor Port (Interface)

use crate::port::QueueListener;
use std::sync::Arc;

/// A running unit that polls exactly one queue
///
/// Bound 1:1 to its queue at construction. Owns zero or more attached
/// listeners and fans received batches out to all of them. The shut-down
/// state is monotonic: once shut down, a monitor never comes back.
pub trait QueueMonitor: Send + Sync {
    /// Attach a listener to this monitor's fan-out set
    fn attach(&self, listener: Arc<dyn QueueListener>);

    /// Detach a listener (by `Arc` identity); returns whether it was attached
    ///
    /// Detaching the last listener does NOT stop the monitor; teardown is
    /// reconciliation-driven.
    fn detach(&self, listener: &Arc<dyn QueueListener>) -> bool;

    /// Stop polling; idempotent
    fn shut_down(&self);

    /// Query the monotonic shut-down state
    fn is_shut_down(&self) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Mock monitor counting every interaction
    ///
    /// Tests assert exact call counts against the counters, so every trait
    /// method increments exactly one of them.
    #[derive(Default)]
    pub struct MockQueueMonitor {
        listeners: Mutex<Vec<Arc<dyn QueueListener>>>,
        attach_calls: Mutex<usize>,
        detach_calls: Mutex<usize>,
        shut_down_calls: Mutex<usize>,
        is_shut_down_calls: Mutex<usize>,
        shut_down: AtomicBool,
    }

    impl MockQueueMonitor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn listener_count(&self) -> usize {
            self.listeners.lock().unwrap().len()
        }

        pub fn attach_calls(&self) -> usize {
            *self.attach_calls.lock().unwrap()
        }

        pub fn detach_calls(&self) -> usize {
            *self.detach_calls.lock().unwrap()
        }

        pub fn shut_down_calls(&self) -> usize {
            *self.shut_down_calls.lock().unwrap()
        }

        pub fn is_shut_down_calls(&self) -> usize {
            *self.is_shut_down_calls.lock().unwrap()
        }

        /// Total calls across all trait methods ("no more interactions" checks)
        pub fn total_calls(&self) -> usize {
            self.attach_calls()
                + self.detach_calls()
                + self.shut_down_calls()
                + self.is_shut_down_calls()
        }

        /// Flip the shut-down flag without counting a `shut_down` call
        /// (simulates a monitor dying on its own)
        pub fn mark_dead(&self) {
            self.shut_down.store(true, Ordering::SeqCst);
        }
    }

    impl QueueMonitor for MockQueueMonitor {
        fn attach(&self, listener: Arc<dyn QueueListener>) {
            *self.attach_calls.lock().unwrap() += 1;
            self.listeners.lock().unwrap().push(listener);
        }

        fn detach(&self, listener: &Arc<dyn QueueListener>) -> bool {
            *self.detach_calls.lock().unwrap() += 1;
            let mut listeners = self.listeners.lock().unwrap();
            let before = listeners.len();
            listeners.retain(|l| !Arc::ptr_eq(l, listener));
            listeners.len() != before
        }

        fn shut_down(&self) {
            *self.shut_down_calls.lock().unwrap() += 1;
            self.shut_down.store(true, Ordering::SeqCst);
        }

        fn is_shut_down(&self) -> bool {
            *self.is_shut_down_calls.lock().unwrap() += 1;
            self.shut_down.load(Ordering::SeqCst)
        }
    }
}
