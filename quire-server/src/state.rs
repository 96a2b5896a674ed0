//! Application state

use anyhow::Result;
use quire_core::remote::LocalContentStore;
use quire_core::storage::LocalStorage;
use quire_core::QuireConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Versioned file store behind the contents API
    pub store: Arc<LocalContentStore>,

    /// Path of the catalog document inside the store
    pub catalog_path: String,

    /// Channel for SSE events
    pub event_tx: broadcast::Sender<ServerEvent>,
}

/// Server-sent events
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// A file was created or replaced
    FileUpdated { path: String, sha: String },
}

impl AppState {
    /// Create state from the environment (`QUIRE_DATA_DIR`, `QUIRE_CATALOG_PATH`)
    pub async fn new() -> Result<Self> {
        let config = QuireConfig::from_env();
        let root = config.data_dir.join("contents");
        tokio::fs::create_dir_all(&root).await?;
        tracing::info!("Serving contents from {}", root.display());

        Ok(Self::with_root(&root, config.catalog_path))
    }

    /// State over files stored under `root`
    pub fn with_root(root: &Path, catalog_path: impl Into<String>) -> Self {
        let storage = Arc::new(LocalStorage::new(PathBuf::from(root)));
        Self::with_store(LocalContentStore::new(storage), catalog_path)
    }

    pub fn with_store(store: LocalContentStore, catalog_path: impl Into<String>) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            store: Arc::new(store),
            catalog_path: catalog_path.into(),
            event_tx,
        }
    }

    /// Subscribe to server events
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.event_tx.subscribe()
    }

    /// Broadcast an event
    pub fn broadcast(&self, event: ServerEvent) {
        // Ignore errors (no subscribers)
        let _ = self.event_tx.send(event);
    }
}
