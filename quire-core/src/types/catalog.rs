//! Flattened catalog entries written to the remote index file

use super::Book;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One published book as listed in the remote catalog
///
/// Unlike [`Book`], an entry references the content by path instead of
/// embedding it. The book id is carried along so the catalog merger can
/// match the entry against the local draft it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Location of the content blob in the remote store
    pub path: String,
    pub title: String,
    pub author: String,
    pub updated: DateTime<Utc>,
}

impl CatalogEntry {
    /// Project a book published at `path` into a catalog entry
    pub fn from_book(book: &Book, path: impl Into<String>) -> Self {
        Self {
            id: Some(book.id.clone()),
            path: path.into(),
            title: book.title.clone(),
            author: book.author.clone(),
            updated: book.updated_at,
        }
    }
}
