//! Publish synchronizer
//!
//! Pushes content to a [`RemoteContentStore`] one file at a time. Each file
//! goes through a read-modify-write cycle guarded by the file's version
//! token:
//!
//! ```text
//! Idle -> Reading -> Writing -> Done
//!            |          |
//!            +----------+-----> Failed
//! ```
//!
//! A stale token fails the cycle with a conflict. Nothing is retried: the
//! caller re-reads and resubmits.

mod catalog;

pub use catalog::upsert_entry;

use crate::catalog::CatalogRecord;
use crate::error::{ErrorKind, QuireError, Result};
use crate::events::{EventHub, Signal};
use crate::remote::{RemoteContentStore, VersionToken};
use crate::types::{Book, CatalogEntry};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default location of the catalog index
pub const DEFAULT_CATALOG_PATH: &str = "books.json";

/// Default folder for published book content
pub const DEFAULT_CONTENT_DIR: &str = "books";

/// Where a single-file publish cycle currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Idle,
    Reading,
    Writing,
    Done,
    Failed(ErrorKind),
}

/// Outcome of one successful read-modify-write cycle
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReport {
    pub path: String,

    /// Token of the version now stored remotely
    pub token: VersionToken,

    /// The file did not exist before
    pub created: bool,

    /// The remote already held identical content, so nothing was written
    pub unchanged: bool,

    /// Every state the cycle went through
    pub history: Vec<PublishState>,
}

/// Both halves of a book publish
#[derive(Debug, Clone, PartialEq)]
pub struct BookPublication {
    pub content: PublishReport,
    pub catalog: PublishReport,
    pub entry: CatalogEntry,
}

/// Why publishing a book failed
#[derive(Debug, Error)]
pub enum PublishError {
    /// The book content could not be written; the remote is unchanged
    #[error("publishing {path} failed: {source}")]
    Content {
        path: String,
        #[source]
        source: QuireError,
    },

    /// The content is live but the catalog still lacks its entry
    ///
    /// Re-run [`Publisher::update_catalog`] with `entry` to repair.
    #[error("{} was published but the catalog was not updated: {source}", .entry.path)]
    CatalogPending {
        content: PublishReport,
        entry: CatalogEntry,
        #[source]
        source: QuireError,
    },
}

impl PublishError {
    /// The underlying failure
    pub fn cause(&self) -> &QuireError {
        match self {
            PublishError::Content { source, .. } | PublishError::CatalogPending { source, .. } => {
                source
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.cause().kind()
    }
}

/// Tracks the states of one cycle
struct Cycle {
    path: String,
    history: Vec<PublishState>,
}

impl Cycle {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            history: vec![PublishState::Idle],
        }
    }

    fn enter(&mut self, state: PublishState) {
        tracing::debug!(path = %self.path, ?state, "publish transition");
        self.history.push(state);
    }

    fn fail(mut self, error: QuireError) -> QuireError {
        self.enter(PublishState::Failed(error.kind()));
        tracing::warn!(path = %self.path, "publish failed: {}", error);
        error
    }
}

/// Publishes drafts and keeps the remote catalog in step
pub struct Publisher {
    store: Arc<dyn RemoteContentStore>,
    catalog_path: String,
    content_dir: String,
    timeout: Option<Duration>,
    events: Option<EventHub>,
}

impl Publisher {
    pub fn new(store: Arc<dyn RemoteContentStore>) -> Self {
        Self {
            store,
            catalog_path: DEFAULT_CATALOG_PATH.to_string(),
            content_dir: DEFAULT_CONTENT_DIR.to_string(),
            timeout: None,
            events: None,
        }
    }

    pub fn with_catalog_path(mut self, path: impl Into<String>) -> Self {
        self.catalog_path = path.into();
        self
    }

    pub fn with_content_dir(mut self, dir: impl Into<String>) -> Self {
        self.content_dir = dir.into();
        self
    }

    /// Bound every remote call; expiry fails the cycle with a timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_events(mut self, hub: EventHub) -> Self {
        self.events = Some(hub);
        self
    }

    pub fn catalog_path(&self) -> &str {
        &self.catalog_path
    }

    /// Remote path of a book's content
    pub fn content_path(&self, book: &Book) -> String {
        let dir = self.content_dir.trim_matches('/');
        if dir.is_empty() {
            format!("{}.json", book.id)
        } else {
            format!("{}/{}.json", dir, book.id)
        }
    }

    /// Publish raw content to `path`, creating or replacing it
    pub async fn publish_file(
        &self,
        path: &str,
        content: Vec<u8>,
        message: &str,
    ) -> Result<PublishReport> {
        self.cycle(path, message, move |_| Ok(content)).await
    }

    /// Publish a book's content, then add or replace its catalog entry
    ///
    /// A book not marked as published is rejected before anything is written.
    pub async fn publish_book(
        &self,
        book: &Book,
    ) -> std::result::Result<BookPublication, PublishError> {
        let path = self.content_path(book);
        if !book.published {
            return Err(PublishError::Content {
                path,
                source: QuireError::Validation(format!(
                    "'{}' is not marked as published",
                    book.display_title()
                )),
            });
        }
        let body = serde_json::to_vec_pretty(book).map_err(|e| PublishError::Content {
            path: path.clone(),
            source: e.into(),
        })?;

        let content = self
            .publish_file(&path, body, &format!("Publish {}", book.display_title()))
            .await
            .map_err(|source| PublishError::Content {
                path: path.clone(),
                source,
            })?;

        let entry = CatalogEntry::from_book(book, &path);
        let catalog = match self.update_catalog(&entry).await {
            Ok(report) => report,
            Err(source) => {
                return Err(PublishError::CatalogPending {
                    content,
                    entry,
                    source,
                })
            }
        };

        tracing::info!(id = %book.id, path = %path, "published '{}'", book.display_title());
        if let Some(events) = &self.events {
            events.broadcast(Signal::DraftPublished(Box::new(CatalogRecord::from(book))));
            events.broadcast(Signal::CatalogChanged);
        }

        Ok(BookPublication {
            content,
            catalog,
            entry,
        })
    }

    /// Add or replace the catalog entry with the same path
    ///
    /// Safe to repeat: submitting an entry that is already present leaves the
    /// catalog untouched. A missing catalog file is created.
    pub async fn update_catalog(&self, entry: &CatalogEntry) -> Result<PublishReport> {
        let message = format!("Update catalog: {}", entry.title);
        self.cycle(&self.catalog_path, &message, |current| {
            upsert_entry(current, entry)
        })
        .await
    }

    /// Whether the book's content is live but missing from the catalog
    ///
    /// Always false for books not marked as published.
    pub async fn needs_catalog_repair(&self, book: &Book) -> Result<bool> {
        if !book.published {
            return Ok(false);
        }
        let path = self.content_path(book);
        if self.bounded(self.store.read_file(&path)).await?.is_none() {
            return Ok(false);
        }

        let listed = match self.bounded(self.store.read_file(&self.catalog_path)).await? {
            Some(file) => catalog::contains_path(&file.content, &path)?,
            None => false,
        };
        Ok(!listed)
    }

    /// One read-modify-write cycle
    ///
    /// `build` maps the current content (if any) to the content to store.
    async fn cycle<F>(&self, path: &str, message: &str, build: F) -> Result<PublishReport>
    where
        F: FnOnce(Option<&[u8]>) -> Result<Vec<u8>>,
    {
        let mut cycle = Cycle::new(path);

        cycle.enter(PublishState::Reading);
        let current = match self.bounded(self.store.read_file(path)).await {
            Ok(current) => current,
            Err(e) => return Err(cycle.fail(e)),
        };

        let next = match build(current.as_ref().map(|f| f.content.as_slice())) {
            Ok(next) => next,
            Err(e) => return Err(cycle.fail(e)),
        };

        if let Some(file) = &current {
            if file.content == next {
                cycle.enter(PublishState::Done);
                return Ok(PublishReport {
                    path: path.to_string(),
                    token: file.token.clone(),
                    created: false,
                    unchanged: true,
                    history: cycle.history,
                });
            }
        }

        cycle.enter(PublishState::Writing);
        let prior = current.map(|f| f.token);
        let created = prior.is_none();

        // A submitted write runs to completion even if this caller goes away
        let store = Arc::clone(&self.store);
        let (write_path, write_message) = (path.to_string(), message.to_string());
        let write = tokio::spawn(async move {
            store
                .write_file(&write_path, next, &write_message, prior.as_ref())
                .await
        });
        let written = self
            .bounded(async {
                write
                    .await
                    .map_err(|e| QuireError::Transport(format!("write task failed: {}", e)))?
            })
            .await;

        match written {
            Ok(token) => {
                cycle.enter(PublishState::Done);
                Ok(PublishReport {
                    path: path.to_string(),
                    token,
                    created,
                    unchanged: false,
                    history: cycle.history,
                })
            }
            Err(e) => Err(cycle.fail(e)),
        }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| QuireError::Timeout(limit))?,
            None => fut.await,
        }
    }
}
