//! Monitor Scheduler - maps queue identifiers to running monitors
//!
//! Many independent listener registrations are multiplexed onto one
//! long-lived monitor per distinct queue. The scheduler owns the
//! identifier-to-monitor mapping, creates monitors on first registration,
//! and reconciles the mapping against the identity provider whenever the
//! external configuration changes.

use crate::domain::QueueId;
use crate::error::{AppError, Result};
use crate::port::{MonitorFactory, QueueListener, QueueMonitor, QueueProvider};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

type MonitorMap = HashMap<QueueId, Arc<dyn QueueMonitor>>;

/// Scheduler owning the queue-identifier to monitor mapping
///
/// All three operations serialize on the mapping lock, so check-then-create
/// is atomic and concurrent first registrations for the same queue still
/// produce exactly one monitor.
pub struct MonitorScheduler {
    handle: Handle,
    provider: Arc<dyn QueueProvider>,
    factory: Arc<dyn MonitorFactory>,
    monitors: Mutex<MonitorMap>,
}

impl MonitorScheduler {
    pub fn new(
        handle: Handle,
        provider: Arc<dyn QueueProvider>,
        factory: Arc<dyn MonitorFactory>,
    ) -> Self {
        Self {
            handle,
            provider,
            factory,
            monitors: Mutex::new(HashMap::new()),
        }
    }

    /// Register a listener for its queue
    ///
    /// Returns `Ok(true)` once the listener is attached to the queue's
    /// monitor (creating the monitor if this is the first registration for
    /// that queue), `Ok(false)` if the queue identifier does not resolve.
    ///
    /// # Errors
    /// - `AppError::Validation` if the listener carries a blank queue id;
    ///   that is a caller bug, not a runtime condition
    pub fn register(&self, listener: Arc<dyn QueueListener>) -> Result<bool> {
        let queue_id = listener.queue_id();
        if queue_id.is_empty() {
            return Err(AppError::Validation(
                "listener carries a blank queue id".to_string(),
            ));
        }

        let mut monitors = self.lock_monitors();

        let Some(queue) = self.provider.resolve(&queue_id) else {
            debug!(queue_id = %queue_id, "Queue id does not resolve, listener not registered");
            return Ok(false);
        };

        let monitor = monitors.entry(queue_id.clone()).or_insert_with(|| {
            info!(queue_id = %queue_id, name = %queue.name, "Starting monitor for queue");
            self.factory.create_monitor(&self.handle, queue)
        });
        monitor.attach(listener);
        Ok(true)
    }

    /// Unregister a listener; safe to call speculatively
    ///
    /// Returns `false` when the listener's queue has no mapped monitor (or
    /// the id is blank). Detaching the last listener does NOT tear the
    /// monitor down; removal is reconciliation-driven only, so a listener
    /// set that briefly drops to zero and refills causes no monitor churn.
    pub fn unregister(&self, listener: &Arc<dyn QueueListener>) -> bool {
        let queue_id = listener.queue_id();
        if queue_id.is_empty() {
            return false;
        }

        let monitors = self.lock_monitors();
        match monitors.get(&queue_id) {
            Some(monitor) => {
                debug!(queue_id = %queue_id, "Detaching listener");
                monitor.detach(listener);
                true
            }
            None => false,
        }
    }

    /// Reconcile the mapping against the identity provider
    ///
    /// Entries whose identifier no longer resolves are shut down and
    /// removed. Entries that still resolve are only queried for shut-down
    /// state; a monitor that already died on its own is dropped so a later
    /// registration starts a fresh one. Unchanged entries are left
    /// completely untouched.
    pub fn on_configuration_changed(&self) {
        let mut monitors = self.lock_monitors();
        monitors.retain(|queue_id, monitor| {
            if self.provider.resolve(queue_id).is_none() {
                info!(queue_id = %queue_id, "Queue no longer configured, shutting monitor down");
                monitor.shut_down();
                return false;
            }
            if monitor.is_shut_down() {
                warn!(queue_id = %queue_id, "Dropping monitor that already shut down");
                return false;
            }
            true
        });
    }

    fn lock_monitors(&self) -> MutexGuard<'_, MonitorMap> {
        // a panic while holding the lock cannot leave the map torn
        // mid-operation, so poisoning is recoverable
        self.monitors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
