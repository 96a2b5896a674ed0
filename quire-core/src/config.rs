//! Runtime configuration read from the environment

use crate::catalog::{CatalogSource, HttpCatalogSource, StaticCatalog, StoreCatalogSource};
use crate::draft::{DraftStore, DEFAULT_STORAGE_KEY};
use crate::events::EventHub;
use crate::publish::{Publisher, DEFAULT_CATALOG_PATH, DEFAULT_CONTENT_DIR};
use crate::remote::{HttpContentStore, RemoteContentStore};
use crate::session::SessionContext;
use crate::storage::LocalStorage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Configuration shared by the CLI and server
#[derive(Debug, Clone, PartialEq)]
pub struct QuireConfig {
    /// Directory holding the local drafts
    pub data_dir: PathBuf,

    /// Storage key of the draft collection
    pub storage_key: String,

    /// Contents root of the remote store, e.g.
    /// `https://api.github.com/repos/<owner>/<repo>/contents`
    pub contents_url: Option<String>,

    /// Branch to publish to (store default when unset)
    pub branch: Option<String>,

    /// Access token for the remote store
    pub token: Option<String>,

    /// Remote path of the catalog index
    pub catalog_path: String,

    /// Remote folder for book content
    pub content_dir: String,

    /// Served library document, read instead of the catalog file when set
    pub library_url: Option<String>,

    /// Limit for each remote call
    pub timeout: Option<Duration>,
}

impl QuireConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            contents_url: None,
            branch: None,
            token: None,
            catalog_path: DEFAULT_CATALOG_PATH.to_string(),
            content_dir: DEFAULT_CONTENT_DIR.to_string(),
            library_url: None,
            timeout: None,
        }
    }

    /// Read `QUIRE_*` environment variables over the defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = match get("QUIRE_DATA_DIR") {
            Some(dir) => Self::new(dir),
            None => Self::default(),
        };

        if let Some(key) = get("QUIRE_STORAGE_KEY") {
            config.storage_key = key;
        }
        config.contents_url = get("QUIRE_CONTENTS_URL");
        config.branch = get("QUIRE_BRANCH");
        config.token = get("QUIRE_TOKEN");
        if let Some(path) = get("QUIRE_CATALOG_PATH") {
            config.catalog_path = path;
        }
        if let Some(dir) = get("QUIRE_CONTENT_DIR") {
            config.content_dir = dir;
        }
        config.library_url = get("QUIRE_LIBRARY_URL");
        config.timeout = get("QUIRE_TIMEOUT_SECS").and_then(|v| match v.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => {
                tracing::warn!("Ignoring invalid QUIRE_TIMEOUT_SECS '{}'", v);
                None
            }
        });

        config
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_contents_url(mut self, url: impl Into<String>) -> Self {
        self.contents_url = Some(url.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Session seeded with the configured token
    pub fn session(&self) -> SessionContext {
        match &self.token {
            Some(token) => SessionContext::with_token(token.clone()),
            None => SessionContext::new(),
        }
    }

    /// Draft store on the local filesystem
    pub fn draft_store(&self, events: EventHub) -> DraftStore {
        DraftStore::new(Arc::new(LocalStorage::new(&self.data_dir)))
            .with_key(self.storage_key.clone())
            .with_events(events)
    }

    /// HTTP remote store, if a contents URL is configured
    pub fn remote_store(
        &self,
        session: Arc<SessionContext>,
    ) -> Option<Arc<dyn RemoteContentStore>> {
        let url = self.contents_url.as_ref()?;
        let mut store = HttpContentStore::new(url.clone(), session);
        if let Some(branch) = &self.branch {
            store = store.with_branch(branch.clone());
        }
        Some(Arc::new(store))
    }

    /// Where the remote half of the merged catalog comes from
    ///
    /// The served library document when configured, else the catalog file in
    /// `remote`, else nothing.
    pub fn catalog_source(
        &self,
        remote: Option<Arc<dyn RemoteContentStore>>,
    ) -> Arc<dyn CatalogSource> {
        match (&self.library_url, remote) {
            (Some(url), _) => Arc::new(HttpCatalogSource::new(url.clone())),
            (None, Some(store)) => {
                Arc::new(StoreCatalogSource::new(store, self.catalog_path.clone()))
            }
            (None, None) => Arc::new(StaticCatalog::default()),
        }
    }

    /// Publisher over `store` using the configured paths and timeout
    pub fn publisher(&self, store: Arc<dyn RemoteContentStore>, events: EventHub) -> Publisher {
        let publisher = Publisher::new(store)
            .with_catalog_path(self.catalog_path.clone())
            .with_content_dir(self.content_dir.clone())
            .with_events(events);
        match self.timeout {
            Some(timeout) => publisher.with_timeout(timeout),
            None => publisher,
        }
    }
}

impl Default for QuireConfig {
    fn default() -> Self {
        let data_dir = directories::ProjectDirs::from("org", "quire", "quire")
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./quire_data"));

        Self::new(data_dir)
    }
}
