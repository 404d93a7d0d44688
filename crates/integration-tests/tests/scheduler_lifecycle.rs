// End-to-end scheduler lifecycle scenario

use std::sync::Arc;
use tokio::runtime::Handle;
use vigil_core::application::MonitorScheduler;
use vigil_core::domain::Queue;
use vigil_core::port::listener::mocks::RecordingListener;
use vigil_core::port::monitor_factory::mocks::MockMonitorFactory;
use vigil_core::port::queue_provider::mocks::MockQueueProvider;
use vigil_core::port::QueueListener;

const UUID_A: &str = "uuid-a";
const UUID_B: &str = "uuid-b";

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    let provider = Arc::new(
        MockQueueProvider::new()
            .with_queue(Queue::new(UUID_A, "builds", "local://builds"))
            .with_queue(Queue::new(UUID_B, "deploys", "local://deploys")),
    );
    let factory = Arc::new(MockMonitorFactory::new());
    let scheduler = MonitorScheduler::new(Handle::current(), provider.clone(), factory.clone());

    // first listener for uuid-a starts its monitor
    let a1: Arc<dyn QueueListener> = Arc::new(RecordingListener::new(UUID_A));
    assert!(scheduler.register(a1.clone()).unwrap());
    assert_eq!(factory.create_calls(), 1);
    let monitor_a = factory.created_for(UUID_A)[0].clone();
    assert_eq!(monitor_a.listener_count(), 1);

    // second listener for uuid-a shares the monitor
    let a2: Arc<dyn QueueListener> = Arc::new(RecordingListener::new(UUID_A));
    assert!(scheduler.register(a2).unwrap());
    assert_eq!(factory.create_calls(), 1);
    assert_eq!(monitor_a.listener_count(), 2);

    // a different queue gets its own monitor
    let b1: Arc<dyn QueueListener> = Arc::new(RecordingListener::new(UUID_B));
    assert!(scheduler.register(b1).unwrap());
    assert_eq!(factory.create_calls(), 2);
    let monitor_b = factory.created_for(UUID_B)[0].clone();
    assert_eq!(monitor_b.listener_count(), 1);

    // unregistering detaches without touching the monitor otherwise
    assert!(scheduler.unregister(&a1));
    assert_eq!(monitor_a.listener_count(), 1);
    assert_eq!(monitor_a.shut_down_calls(), 0);

    // uuid-b drops out of configuration; reconciliation shuts exactly it down
    provider.remove(UUID_B);
    scheduler.on_configuration_changed();

    assert_eq!(monitor_b.shut_down_calls(), 1);
    assert_eq!(monitor_b.is_shut_down_calls(), 0);
    assert_eq!(monitor_a.shut_down_calls(), 0);
    assert_eq!(monitor_a.is_shut_down_calls(), 1);
    assert_eq!(factory.create_calls(), 2);

    // uuid-b registrations now fail cleanly until it is configured again
    let b2: Arc<dyn QueueListener> = Arc::new(RecordingListener::new(UUID_B));
    assert!(!scheduler.register(b2.clone()).unwrap());

    provider.insert(Queue::new(UUID_B, "deploys", "local://deploys"));
    assert!(scheduler.register(b2).unwrap());
    // a brand-new monitor, never the shut-down instance
    assert_eq!(factory.create_calls(), 3);
    assert_eq!(factory.created_for(UUID_B).len(), 2);
}
