//! Core types for drafts and published catalog entries

mod book;
mod catalog;
mod chapter;
mod cover;

pub use book::{Book, BookPatch, BookStructure};
pub use catalog::CatalogEntry;
pub use chapter::{Chapter, ChapterPatch};
pub use cover::Cover;

/// Fresh identifier for books and chapters
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
