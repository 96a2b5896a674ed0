//! CLI command implementations

mod books;
mod catalog;
mod chapters;
mod export;
mod publish;

pub use books::{cover, delete, edit, list, new_book, show};
pub use catalog::catalog;
pub use chapters::{chapter_add, chapter_delete, chapter_edit, chapter_move};
pub use export::export;
pub use publish::{publish, repair_catalog};

use anyhow::{anyhow, Result};
use quire_core::remote::RemoteContentStore;
use quire_core::{DraftStore, EventHub, Publisher, QuireConfig, QuireError};
use std::sync::Arc;

/// Everything a command needs, built once from the configuration
pub struct Workspace {
    pub config: QuireConfig,
    pub events: EventHub,
    pub drafts: Arc<DraftStore>,
}

impl Workspace {
    pub fn open(config: QuireConfig) -> Self {
        let events = EventHub::default();
        let drafts = Arc::new(config.draft_store(events.clone()));
        tracing::debug!("Using drafts in {}", config.data_dir.display());
        Self {
            config,
            events,
            drafts,
        }
    }

    /// The configured remote store, if any
    pub fn remote(&self) -> Option<Arc<dyn RemoteContentStore>> {
        self.config.remote_store(Arc::new(self.config.session()))
    }

    /// Publisher for the configured remote store
    pub fn publisher(&self) -> Result<Publisher> {
        let store = self.remote().ok_or_else(|| {
            anyhow!("No remote store configured; set QUIRE_CONTENTS_URL or pass --remote")
        })?;
        Ok(self.config.publisher(store, self.events.clone()))
    }
}

/// Attach the recovery hint to a core error
pub fn explain(e: QuireError) -> anyhow::Error {
    anyhow!("{} ({})", e, e.remedy())
}
