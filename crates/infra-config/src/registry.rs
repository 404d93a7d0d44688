// File-backed Queue Registry (QueueProvider adapter)

use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{info, warn};
use vigil_core::domain::{Queue, QueueId};
use vigil_core::port::QueueProvider;
use vigil_core::{AppError, Result};

/// Shape of the queue configuration file
#[derive(Debug, Deserialize)]
struct QueuesFile {
    #[serde(default)]
    queues: Vec<Queue>,
}

/// Queue registry loaded from a configuration file
///
/// The engine's Queue Identity Provider. `resolve` answers from the
/// currently loaded snapshot; `reload` re-reads the backing file, `apply`
/// swaps the set in place. Identifiers that disappear between snapshots
/// simply stop resolving; the scheduler picks that up on its next
/// reconciliation pass.
pub struct FileQueueRegistry {
    path: Option<PathBuf>,
    queues: RwLock<HashMap<QueueId, Queue>>,
}

impl FileQueueRegistry {
    /// Load from a config file (format inferred from the extension)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let queues = read_file(&path)?;
        info!(path = %path.display(), queue_count = queues.len(), "Queue registry loaded");
        Ok(Self {
            path: Some(path),
            queues: RwLock::new(index(queues)),
        })
    }

    /// Build from literal TOML (embedded defaults, tests)
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let queues = parse(Config::builder().add_source(File::from_str(source, FileFormat::Toml)))?;
        Ok(Self {
            path: None,
            queues: RwLock::new(index(queues)),
        })
    }

    /// Re-read the backing file; returns the number of configured queues
    ///
    /// # Errors
    /// - `AppError::Config` if the registry has no backing file or the file
    ///   no longer parses; the previous snapshot stays in effect
    pub fn reload(&self) -> Result<usize> {
        let Some(path) = &self.path else {
            return Err(AppError::Config(
                "registry has no backing file to reload".to_string(),
            ));
        };
        let queues = read_file(path)?;
        Ok(self.apply(queues))
    }

    /// Swap the configured queue set in place
    pub fn apply(&self, queues: Vec<Queue>) -> usize {
        let indexed = index(queues);
        let count = indexed.len();
        *self.queues.write().unwrap_or_else(|e| e.into_inner()) = indexed;
        info!(queue_count = count, "Queue registry updated");
        count
    }

    /// Identifiers currently configured
    pub fn queue_ids(&self) -> Vec<QueueId> {
        self.queues
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}

impl QueueProvider for FileQueueRegistry {
    fn resolve(&self, id: &QueueId) -> Option<Queue> {
        self.queues
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }
}

fn read_file(path: &Path) -> Result<Vec<Queue>> {
    parse(Config::builder().add_source(File::from(path.to_path_buf())))
}

fn parse(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Vec<Queue>> {
    let parsed: QueuesFile = builder
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?
        .try_deserialize()
        .map_err(|e| AppError::Config(e.to_string()))?;
    Ok(parsed.queues)
}

fn index(queues: Vec<Queue>) -> HashMap<QueueId, Queue> {
    let mut indexed = HashMap::with_capacity(queues.len());
    for queue in queues {
        let id = queue.id.clone();
        if indexed.insert(id.clone(), queue).is_some() {
            warn!(queue_id = %id, "Duplicate queue id in configuration, last entry wins");
        }
    }
    indexed
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUEUES_TOML: &str = r#"
        [[queues]]
        id = "uuid-a"
        name = "builds"
        endpoint = "local://builds"
        max_messages = 5

        [[queues]]
        id = "uuid-b"
        name = "deploys"
        endpoint = "local://deploys"
    "#;

    #[test]
    fn test_resolve_known_and_unknown() {
        let registry = FileQueueRegistry::from_toml_str(QUEUES_TOML).unwrap();

        let queue = registry.resolve(&"uuid-a".to_string()).unwrap();
        assert_eq!(queue.name, "builds");
        assert_eq!(queue.max_messages, 5);
        // omitted field falls back to the domain default
        assert_eq!(queue.wait_time_secs, vigil_core::domain::queue::DEFAULT_WAIT_TIME_SECS);

        assert!(registry.resolve(&"unknown".to_string()).is_none());
    }

    #[test]
    fn test_apply_replaces_snapshot() {
        let registry = FileQueueRegistry::from_toml_str(QUEUES_TOML).unwrap();
        assert_eq!(registry.queue_ids().len(), 2);

        let count = registry.apply(vec![Queue::new("uuid-c", "audits", "local://audits")]);

        assert_eq!(count, 1);
        assert!(registry.resolve(&"uuid-a".to_string()).is_none());
        assert!(registry.resolve(&"uuid-c".to_string()).is_some());
    }

    #[test]
    fn test_duplicate_id_last_entry_wins() {
        let registry = FileQueueRegistry::from_toml_str(
            r#"
            [[queues]]
            id = "uuid-a"
            name = "first"
            endpoint = "local://first"

            [[queues]]
            id = "uuid-a"
            name = "second"
            endpoint = "local://second"
        "#,
        )
        .unwrap();

        assert_eq!(registry.queue_ids().len(), 1);
        assert_eq!(registry.resolve(&"uuid-a".to_string()).unwrap().name, "second");
    }

    #[test]
    fn test_reload_without_backing_file_errors() {
        let registry = FileQueueRegistry::from_toml_str(QUEUES_TOML).unwrap();

        assert!(matches!(registry.reload(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_and_reload_from_file() {
        let path = std::env::temp_dir().join(format!("vigil-registry-{}.toml", std::process::id()));
        std::fs::write(&path, QUEUES_TOML).unwrap();

        let registry = FileQueueRegistry::load(&path).unwrap();
        assert_eq!(registry.queue_ids().len(), 2);

        std::fs::write(
            &path,
            r#"
            [[queues]]
            id = "uuid-a"
            name = "builds"
            endpoint = "local://builds"
        "#,
        )
        .unwrap();

        assert_eq!(registry.reload().unwrap(), 1);
        assert!(registry.resolve(&"uuid-b".to_string()).is_none());

        let _ = std::fs::remove_file(&path);
    }
}
