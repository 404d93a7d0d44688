// Polling Monitor - one long-lived receive loop per queue

mod constants;
mod factory;
mod shutdown;

use constants::*;
pub use factory::PollingMonitorFactory;
pub use shutdown::{ShutdownSignal, ShutdownToken};

use crate::domain::{Queue, QueueMessage};
use crate::port::{QueueClient, QueueListener, QueueMonitor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::time::sleep;
use tracing::{debug, error, info};

type ListenerSet = Arc<Mutex<Vec<Arc<dyn QueueListener>>>>;

/// Polls one queue and fans received batches out to attached listeners
///
/// Constructed cold; the first attached listener starts the polling task on
/// the runtime handle. Shut-down is monotonic: the task stops and never
/// restarts, even if listeners are attached afterwards.
pub struct PollingMonitor {
    queue: Queue,
    client: Arc<dyn QueueClient>,
    handle: Handle,
    listeners: ListenerSet,
    shutdown: Arc<ShutdownSignal>,
    started: AtomicBool,
}

impl PollingMonitor {
    pub fn new(handle: Handle, client: Arc<dyn QueueClient>, queue: Queue) -> Self {
        Self {
            queue,
            client,
            handle,
            listeners: Arc::new(Mutex::new(Vec::new())),
            shutdown: Arc::new(ShutdownSignal::new()),
            started: AtomicBool::new(false),
        }
    }

    fn start(&self) {
        let queue = self.queue.clone();
        let client = self.client.clone();
        let listeners = self.listeners.clone();
        let shutdown = self.shutdown.clone();
        self.handle
            .spawn(poll_loop(queue, client, listeners, shutdown));
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<Arc<dyn QueueListener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl QueueMonitor for PollingMonitor {
    fn attach(&self, listener: Arc<dyn QueueListener>) {
        self.lock_listeners().push(listener);
        if !self.started.swap(true, Ordering::SeqCst) {
            self.start();
        }
    }

    fn detach(&self, listener: &Arc<dyn QueueListener>) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|attached| !Arc::ptr_eq(attached, listener));
        listeners.len() != before
    }

    fn shut_down(&self) {
        self.shutdown.trigger();
    }

    fn is_shut_down(&self) -> bool {
        self.shutdown.is_triggered()
    }
}

async fn poll_loop(
    queue: Queue,
    client: Arc<dyn QueueClient>,
    listeners: ListenerSet,
    shutdown: Arc<ShutdownSignal>,
) {
    let mut token = shutdown.token();
    info!(queue_id = %queue.id, name = %queue.name, "Queue monitor started");

    loop {
        if token.is_triggered() {
            break;
        }

        tokio::select! {
            _ = token.wait() => break,
            received = client.receive(&queue) => match received {
                Ok(messages) if messages.is_empty() => {
                    // long-poll wait expired with nothing pending
                }
                Ok(messages) => {
                    deliver(&queue, &client, &listeners, messages).await;
                }
                Err(e) => {
                    error!(queue_id = %queue.id, error = %e, "Receive failed");
                    tokio::select! {
                        _ = sleep(ERROR_RECOVERY_SLEEP_DURATION) => {}
                        _ = token.wait() => break,
                    }
                }
            }
        }
    }

    // covers the task stopping on its own as well; triggering twice is harmless
    shutdown.trigger();
    info!(queue_id = %queue.id, "Queue monitor stopped");
}

async fn deliver(
    queue: &Queue,
    client: &Arc<dyn QueueClient>,
    listeners: &ListenerSet,
    messages: Vec<QueueMessage>,
) {
    let snapshot: Vec<Arc<dyn QueueListener>> = listeners
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    debug!(
        queue_id = %queue.id,
        count = messages.len(),
        listeners = snapshot.len(),
        "Delivering batch"
    );

    for listener in &snapshot {
        listener.on_messages(&messages);
    }

    let receipts: Vec<String> = messages.iter().map(|m| m.receipt.clone()).collect();
    if let Err(e) = client.delete(queue, &receipts).await {
        error!(queue_id = %queue.id, error = %e, "Failed to delete handled batch");
    }
}
