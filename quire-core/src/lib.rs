//! Quire Core Library
//!
//! Local book drafting and publishing. Drafts live in a [`DraftStore`] on the
//! author's device; a [`Publisher`] pushes them to a versioned remote content
//! store and keeps the shared catalog index up to date; a [`Library`] merges
//! the remote catalog with locally published drafts for display.

pub mod catalog;
pub mod config;
pub mod draft;
pub mod error;
pub mod events;
pub mod publish;
pub mod remote;
pub mod session;
pub mod storage;
pub mod types;

pub use catalog::{merge_catalog, CatalogRecord, Library, Renderer};
pub use config::QuireConfig;
pub use draft::{DraftStore, ExportArchive};
pub use error::{ErrorKind, QuireError, Result, StorageError};
pub use events::{EventHub, Signal};
pub use publish::{PublishError, PublishReport, PublishState, Publisher};
pub use remote::{RemoteContentStore, VersionToken};
pub use session::SessionContext;
pub use types::{Book, BookPatch, BookStructure, CatalogEntry, Chapter, ChapterPatch, Cover};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_creation() {
        let book = Book::new();
        assert_eq!(book.title, "Untitled");
        assert_eq!(book.structure, BookStructure::Chapters);
    }
}
