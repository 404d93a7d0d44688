// Polling Monitor Factory

use super::PollingMonitor;
use crate::domain::Queue;
use crate::port::{MonitorFactory, QueueClient, QueueMonitor};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Builds cold polling monitors sharing one transport client
pub struct PollingMonitorFactory {
    client: Arc<dyn QueueClient>,
}

impl PollingMonitorFactory {
    pub fn new(client: Arc<dyn QueueClient>) -> Self {
        Self { client }
    }
}

impl MonitorFactory for PollingMonitorFactory {
    fn create_monitor(&self, handle: &Handle, queue: Queue) -> Arc<dyn QueueMonitor> {
        Arc::new(PollingMonitor::new(handle.clone(), self.client.clone(), queue))
    }
}
