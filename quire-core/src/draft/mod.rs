//! Local draft store
//!
//! Keeps every draft book in a single JSON document under one storage key.
//! Each operation loads the whole collection, applies its change and writes
//! the whole collection back, so callers always see a consistent snapshot.

mod export;

pub use export::{
    chapter_filename, sanitize_filename, ExportArchive, ExportFile, ExportManifest,
    ManifestChapter, MANIFEST_FILENAME,
};

use crate::error::{QuireError, Result, StorageError};
use crate::events::{EventHub, Signal};
use crate::storage::StorageProvider;
use crate::types::{Book, BookPatch, Chapter, ChapterPatch, Cover};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default storage key of the draft collection
pub const DEFAULT_STORAGE_KEY: &str = "localBooks_v1";

/// Durable store of draft books for one device
pub struct DraftStore {
    storage: Arc<dyn StorageProvider>,
    key: String,
    events: Option<EventHub>,
    // Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl DraftStore {
    pub fn new(storage: Arc<dyn StorageProvider>) -> Self {
        Self {
            storage,
            key: DEFAULT_STORAGE_KEY.to_string(),
            events: None,
            lock: Mutex::new(()),
        }
    }

    /// Use a different storage key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Announce every successful write on `hub`
    pub fn with_events(mut self, hub: EventHub) -> Self {
        self.events = Some(hub);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// All drafts, most recently created first
    pub async fn list(&self) -> Result<Vec<Book>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    pub async fn get(&self, id: &str) -> Result<Book> {
        self.list()
            .await?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| QuireError::NotFound(format!("book {}", id)))
    }

    /// Drafts flagged as published
    pub async fn published_books(&self) -> Result<Vec<Book>> {
        let mut books = self.list().await?;
        books.retain(|b| b.published);
        Ok(books)
    }

    pub async fn create_book(&self) -> Result<Book> {
        self.modify(|books| {
            let book = Book::new();
            books.insert(0, book.clone());
            tracing::debug!(id = %book.id, "created draft");
            Ok((book, true))
        })
        .await
    }

    pub async fn update_book(&self, id: &str, patch: BookPatch) -> Result<Book> {
        self.modify(|books| {
            let book = find_book(books, id)?;
            patch.apply(book);
            book.touch();
            Ok((book.clone(), true))
        })
        .await
    }

    /// Remove a book with its chapters and cover; unknown ids are ignored
    pub async fn delete_book(&self, id: &str) -> Result<()> {
        self.modify(|books| {
            let before = books.len();
            books.retain(|b| b.id != id);
            Ok(((), books.len() != before))
        })
        .await
    }

    pub async fn set_cover(&self, id: &str, filename: &str, data: Vec<u8>) -> Result<Book> {
        self.modify(|books| {
            let book = find_book(books, id)?;
            book.cover = Some(Cover::new(filename, data));
            book.touch();
            Ok((book.clone(), true))
        })
        .await
    }

    /// Append a chapter; the title must not be blank
    pub async fn add_chapter(&self, book_id: &str, title: &str) -> Result<Chapter> {
        let title = title.trim();
        if title.is_empty() {
            return Err(QuireError::Validation(
                "chapter title must not be empty".to_string(),
            ));
        }

        self.modify(|books| {
            let book = find_book(books, book_id)?;
            let chapter = Chapter::new(title);
            book.chapters.push(chapter.clone());
            book.touch();
            Ok((chapter, true))
        })
        .await
    }

    pub async fn update_chapter(
        &self,
        book_id: &str,
        chapter_id: &str,
        patch: ChapterPatch,
    ) -> Result<Chapter> {
        self.modify(|books| {
            let book = find_book(books, book_id)?;
            let index = find_chapter(book, chapter_id)?;
            patch.apply(&mut book.chapters[index]);
            let chapter = book.chapters[index].clone();
            book.touch();
            Ok((chapter, true))
        })
        .await
    }

    pub async fn delete_chapter(&self, book_id: &str, chapter_id: &str) -> Result<()> {
        self.modify(|books| {
            let book = find_book(books, book_id)?;
            let index = find_chapter(book, chapter_id)?;
            book.chapters.remove(index);
            book.touch();
            Ok(((), true))
        })
        .await
    }

    /// Move the chapter at `from` so it ends up at `to`
    ///
    /// Out-of-range indices leave the book untouched.
    pub async fn move_chapter(&self, book_id: &str, from: usize, to: usize) -> Result<()> {
        self.modify(|books| {
            let book = find_book(books, book_id)?;
            let len = book.chapters.len();
            if from >= len || to >= len {
                return Ok(((), false));
            }
            let chapter = book.chapters.remove(from);
            book.chapters.insert(to, chapter);
            book.touch();
            Ok(((), true))
        })
        .await
    }

    /// Bundle a book for download
    pub async fn export_book(&self, id: &str) -> Result<ExportArchive> {
        let book = self.get(id).await?;
        ExportArchive::from_book(&book)
    }

    async fn modify<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Book>) -> Result<(T, bool)>,
    {
        let _guard = self.lock.lock().await;
        let mut books = self.load().await?;
        let (value, changed) = f(&mut books)?;
        if changed {
            self.save(&books).await?;
        }
        Ok(value)
    }

    /// Load the collection; corrupt data reads as empty
    async fn load(&self) -> Result<Vec<Book>> {
        let data = match self.storage.read(&self.key).await {
            Ok(data) => data,
            Err(StorageError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let raw: Vec<serde_json::Value> = match serde_json::from_slice(&data) {
            Ok(serde_json::Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!(key = %self.key, "Stored drafts are not a list, starting fresh");
                return Ok(Vec::new());
            }
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    "Failed to parse stored drafts, starting fresh: {}",
                    e
                );
                return Ok(Vec::new());
            }
        };

        Ok(raw
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Book>(item) {
                Ok(book) => Some(book),
                Err(e) => {
                    tracing::warn!("Skipping malformed draft: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Serialize fully before touching storage so a failure never half-writes
    async fn save(&self, books: &[Book]) -> Result<()> {
        let data = serde_json::to_vec(books)?;
        self.storage
            .write(&self.key, data)
            .await
            .map_err(|e| QuireError::Serialization(format!("failed to persist drafts: {}", e)))?;

        if let Some(events) = &self.events {
            events.broadcast(Signal::StorageChanged {
                key: self.key.clone(),
            });
        }
        Ok(())
    }
}

fn find_book<'a>(books: &'a mut [Book], id: &str) -> Result<&'a mut Book> {
    books
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or_else(|| QuireError::NotFound(format!("book {}", id)))
}

fn find_chapter(book: &Book, chapter_id: &str) -> Result<usize> {
    book.chapter_index(chapter_id)
        .ok_or_else(|| QuireError::NotFound(format!("chapter {} in book {}", chapter_id, book.id)))
}
