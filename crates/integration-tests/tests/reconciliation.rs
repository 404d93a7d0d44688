// Configuration reload reconciliation against live monitors

use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use vigil_core::application::{MonitorScheduler, PollingMonitorFactory};
use vigil_core::domain::Queue;
use vigil_core::port::listener::mocks::RecordingListener;
use vigil_core::port::QueueListener;
use vigil_infra_config::FileQueueRegistry;
use vigil_infra_memory::MemoryQueueClient;

const TWO_QUEUES: &str = r#"
    [[queues]]
    id = "uuid-a"
    name = "builds"
    endpoint = "local://builds"
    wait_time_secs = 1

    [[queues]]
    id = "uuid-b"
    name = "deploys"
    endpoint = "local://deploys"
    wait_time_secs = 1
"#;

fn queue(id: &str, name: &str) -> Queue {
    let mut queue = Queue::new(id, name, format!("local://{}", name));
    queue.wait_time_secs = 1;
    queue
}

async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..80 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    condition()
}

struct Fixture {
    client: Arc<MemoryQueueClient>,
    registry: Arc<FileQueueRegistry>,
    scheduler: MonitorScheduler,
}

fn fixture() -> Fixture {
    let client = Arc::new(MemoryQueueClient::new());
    client.register_queue("uuid-a");
    client.register_queue("uuid-b");
    let registry = Arc::new(FileQueueRegistry::from_toml_str(TWO_QUEUES).unwrap());
    let factory = Arc::new(PollingMonitorFactory::new(client.clone()));
    let scheduler = MonitorScheduler::new(Handle::current(), registry.clone(), factory);
    Fixture {
        client,
        registry,
        scheduler,
    }
}

#[tokio::test]
async fn test_removed_queue_monitor_stops_polling() {
    let f = fixture();
    let listener_a = Arc::new(RecordingListener::new("uuid-a"));
    let listener_b = Arc::new(RecordingListener::new("uuid-b"));
    assert!(f.scheduler.register(listener_a.clone()).unwrap());
    assert!(f.scheduler.register(listener_b.clone()).unwrap());

    // uuid-b disappears from the configuration
    f.registry.apply(vec![queue("uuid-a", "builds")]);
    f.scheduler.on_configuration_changed();
    // give the uuid-b polling task a moment to observe the shutdown
    tokio::time::sleep(Duration::from_millis(100)).await;

    // messages for the removed queue stay pending: nobody polls it anymore
    f.client.push("uuid-b", "orphaned").unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(listener_b.message_count(), 0);
    assert_eq!(f.client.pending_count("uuid-b"), 1);

    // the surviving queue keeps delivering
    f.client.push("uuid-a", "alive").unwrap();
    assert!(eventually(|| listener_a.message_count() == 1).await);

    // and registering for the removed queue now reports failure
    let late: Arc<dyn QueueListener> = Arc::new(RecordingListener::new("uuid-b"));
    assert!(!f.scheduler.register(late).unwrap());
}

#[tokio::test]
async fn test_requeue_after_reconfiguration_gets_fresh_monitor() {
    let f = fixture();
    let listener_b = Arc::new(RecordingListener::new("uuid-b"));
    assert!(f.scheduler.register(listener_b.clone()).unwrap());

    // drop uuid-b, reconcile, then bring it back
    f.registry.apply(vec![queue("uuid-a", "builds")]);
    f.scheduler.on_configuration_changed();
    tokio::time::sleep(Duration::from_millis(100)).await;

    f.registry
        .apply(vec![queue("uuid-a", "builds"), queue("uuid-b", "deploys")]);

    let fresh = Arc::new(RecordingListener::new("uuid-b"));
    assert!(f.scheduler.register(fresh.clone()).unwrap());
    f.client.push("uuid-b", "delivered-again").unwrap();

    assert!(eventually(|| fresh.message_count() == 1).await);
    // the old listener went down with the old monitor and stays quiet
    assert_eq!(listener_b.message_count(), 0);
}

#[tokio::test]
async fn test_unchanged_reload_keeps_monitor_delivering() {
    let f = fixture();
    let listener_a = Arc::new(RecordingListener::new("uuid-a"));
    assert!(f.scheduler.register(listener_a.clone()).unwrap());

    f.client.push("uuid-a", "before").unwrap();
    assert!(eventually(|| listener_a.message_count() == 1).await);

    // same configuration applied again: reconciliation is a no-op
    f.registry
        .apply(vec![queue("uuid-a", "builds"), queue("uuid-b", "deploys")]);
    f.scheduler.on_configuration_changed();

    f.client.push("uuid-a", "after").unwrap();
    assert!(eventually(|| listener_a.message_count() == 2).await);
}
