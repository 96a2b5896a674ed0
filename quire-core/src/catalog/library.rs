//! The merged library view handed to renderers

use super::{merge_catalog, CatalogRecord, CatalogSource};
use crate::draft::DraftStore;
use crate::events::{EventHub, Signal};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Draws the catalog; writes go through the [`DraftStore`], never here
pub trait Renderer: Send + Sync {
    fn render(&self, catalog: &[CatalogRecord]);
}

/// Combines the remote catalog with the locally published drafts
pub struct Library {
    source: Arc<dyn CatalogSource>,
    drafts: Arc<DraftStore>,
}

impl Library {
    pub fn new(source: Arc<dyn CatalogSource>, drafts: Arc<DraftStore>) -> Self {
        Self { source, drafts }
    }

    /// The merged, de-duplicated and ordered catalog
    ///
    /// Never fails: an unreachable remote or unreadable drafts degrade to an
    /// empty half.
    pub async fn merged_catalog(&self) -> Vec<CatalogRecord> {
        let remote = match self.source.fetch().await {
            Ok(records) => records,
            Err(e) => {
                tracing::info!("Could not fetch remote library: {}", e);
                Vec::new()
            }
        };

        let local = match self.drafts.published_books().await {
            Ok(books) => books.iter().map(CatalogRecord::from).collect(),
            Err(e) => {
                tracing::warn!("Failed to load local drafts: {}", e);
                Vec::new()
            }
        };

        merge_catalog(remote, local)
    }

    /// Render now, then re-render on every relevant signal until `hub` closes
    ///
    /// Abort the returned handle to stop watching.
    pub fn watch(
        self: Arc<Self>,
        hub: &EventHub,
        renderer: Arc<dyn Renderer>,
    ) -> JoinHandle<()> {
        let mut rx = hub.subscribe();
        tokio::spawn(async move {
            renderer.render(&self.merged_catalog().await);
            loop {
                match rx.recv().await {
                    Ok(Signal::StorageChanged { key }) if key != self.drafts.key() => continue,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "catalog watcher lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
                renderer.render(&self.merged_catalog().await);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::error::{QuireError, Result};
    use crate::storage::MemoryStorage;
    use crate::types::BookPatch;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct Unreachable;

    #[async_trait]
    impl CatalogSource for Unreachable {
        async fn fetch(&self) -> Result<Vec<CatalogRecord>> {
            Err(QuireError::Transport("connection refused".to_string()))
        }
    }

    struct ChannelRenderer(Mutex<mpsc::UnboundedSender<Vec<String>>>);

    impl Renderer for ChannelRenderer {
        fn render(&self, catalog: &[CatalogRecord]) {
            let titles = catalog.iter().map(|r| r.display_title().to_string()).collect();
            let _ = self.0.lock().unwrap().send(titles);
        }
    }

    async fn published_draft(drafts: &DraftStore, title: &str) {
        let book = drafts.create_book().await.unwrap();
        drafts
            .update_book(&book.id, BookPatch::default().title(title).published(true))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remote_failure_degrades_to_local_view() {
        let drafts = Arc::new(DraftStore::new(Arc::new(MemoryStorage::new())));
        published_draft(&drafts, "Local Only").await;
        drafts.create_book().await.unwrap();

        let library = Library::new(Arc::new(Unreachable), drafts);
        let merged = library.merged_catalog().await;
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].display_title(), "Local Only");
    }

    #[tokio::test]
    async fn test_watch_rerenders_on_draft_changes() {
        let hub = EventHub::default();
        let drafts = Arc::new(
            DraftStore::new(Arc::new(MemoryStorage::new())).with_events(hub.clone()),
        );
        let remote: Vec<CatalogRecord> =
            serde_json::from_str(r#"[{"id": "r1", "title": "Remote"}]"#).unwrap();
        let library = Arc::new(Library::new(Arc::new(StaticCatalog(remote)), drafts.clone()));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _watcher = library.watch(&hub, Arc::new(ChannelRenderer(Mutex::new(tx))));

        assert_eq!(rx.recv().await.unwrap(), vec!["Remote"]);

        published_draft(&drafts, "Fresh").await;
        loop {
            let titles = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("watcher stopped rendering")
                .unwrap();
            if titles == vec!["Fresh", "Remote"] {
                break;
            }
        }
    }
}
