//! Vigil Queue Engine - Main Entry Point
//! Composition root: queue registry + transport + scheduler wiring

mod listener;

use anyhow::Result;
use listener::LogListener;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vigil_core::application::{MonitorScheduler, PollingMonitorFactory};
use vigil_core::domain::QueueId;
use vigil_core::port::QueueListener;
use vigil_infra_config::FileQueueRegistry;
use vigil_infra_memory::MemoryQueueClient;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_QUEUES_FILE: &str = "queues.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (JSON for production, pretty for development)
    let log_format = std::env::var("VIGIL_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Vigil Queue Engine v{} starting...", VERSION);

    // 2. Load queue configuration
    let queues_file =
        std::env::var("VIGIL_QUEUES_FILE").unwrap_or_else(|_| DEFAULT_QUEUES_FILE.to_string());
    info!(queues_file = %queues_file, "Loading queue configuration...");
    let registry = Arc::new(
        FileQueueRegistry::load(&queues_file)
            .map_err(|e| anyhow::anyhow!("Queue configuration load failed: {}", e))?,
    );

    // 3. Setup dependencies (DI wiring)
    let client = Arc::new(MemoryQueueClient::new());
    let factory = Arc::new(PollingMonitorFactory::new(client.clone()));
    let scheduler = Arc::new(MonitorScheduler::new(
        Handle::current(),
        registry.clone(),
        factory,
    ));

    // 4. Register one listener per configured queue
    let mut listeners: HashMap<QueueId, Arc<dyn QueueListener>> = HashMap::new();
    sync_listeners(&scheduler, &registry, &client, &mut listeners)?;

    // 5. Optional demo publisher (the in-process transport has no external producer)
    if let Some(interval_secs) = std::env::var("VIGIL_DEMO_PUBLISH_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
    {
        spawn_demo_publisher(client.clone(), registry.clone(), interval_secs);
    }

    info!("System ready. Monitoring {} queue(s)", listeners.len());
    info!("SIGHUP reloads configuration, Ctrl+C shuts down");

    // 6. Signal loop: SIGHUP reloads, Ctrl+C exits
    let mut hangup = signal(SignalKind::hangup())?;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = hangup.recv() => {
                info!("SIGHUP received, reloading queue configuration");
                match registry.reload() {
                    Ok(count) => {
                        scheduler.on_configuration_changed();
                        if let Err(e) = sync_listeners(&scheduler, &registry, &client, &mut listeners) {
                            warn!(error = %e, "Listener resync failed");
                        }
                        info!(queue_count = count, "Reload complete");
                    }
                    Err(e) => warn!(error = %e, "Reload failed, keeping previous configuration"),
                }
            }
        }
    }

    // 7. Graceful shutdown
    info!("Shutdown signal received. Exiting gracefully...");
    for listener in listeners.values() {
        scheduler.unregister(listener);
    }
    info!("Shutdown complete.");

    Ok(())
}

/// Bring the listener set in line with the configured queues
///
/// New queues get a log listener (and a transport buffer); queues that
/// disappeared have their listener unregistered and dropped. Monitors for
/// removed queues are already gone by the time this runs after a reload.
fn sync_listeners(
    scheduler: &MonitorScheduler,
    registry: &FileQueueRegistry,
    client: &MemoryQueueClient,
    listeners: &mut HashMap<QueueId, Arc<dyn QueueListener>>,
) -> Result<()> {
    let configured = registry.queue_ids();

    listeners.retain(|queue_id, listener| {
        if configured.contains(queue_id) {
            true
        } else {
            scheduler.unregister(listener);
            info!(queue_id = %queue_id, "Listener removed for deconfigured queue");
            false
        }
    });

    for queue_id in configured {
        client.register_queue(queue_id.clone());
        if !listeners.contains_key(&queue_id) {
            let listener: Arc<dyn QueueListener> = Arc::new(LogListener::new(queue_id.clone()));
            if scheduler.register(listener.clone())? {
                listeners.insert(queue_id, listener);
            }
        }
    }
    Ok(())
}

/// Push a generated message to every configured queue on an interval
fn spawn_demo_publisher(
    client: Arc<MemoryQueueClient>,
    registry: Arc<FileQueueRegistry>,
    interval_secs: u64,
) {
    info!(interval_secs, "Demo publisher enabled");
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        let mut sequence: u64 = 0;
        loop {
            tick.tick().await;
            for queue_id in registry.queue_ids() {
                sequence += 1;
                let body = serde_json::json!({
                    "sequence": sequence,
                    "queue": queue_id,
                })
                .to_string();
                if let Err(e) = client.push(&queue_id, body) {
                    warn!(queue_id = %queue_id, error = %e, "Demo publish failed");
                }
            }
        }
    });
}
