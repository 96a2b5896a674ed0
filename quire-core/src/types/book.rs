//! The draft Book type - the unit the editor works on

use super::{Chapter, Cover};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a book is read as a single body or chapter by chapter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookStructure {
    /// One continuous body of text
    Flat,

    /// An ordered list of chapters
    #[default]
    Chapters,
}

impl BookStructure {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStructure::Flat => "flat",
            BookStructure::Chapters => "chapters",
        }
    }
}

impl std::str::FromStr for BookStructure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(BookStructure::Flat),
            "chapters" => Ok(BookStructure::Chapters),
            other => Err(format!("unknown structure '{}'", other)),
        }
    }
}

/// A book as authored locally, embedding its full content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Unique identifier, never reused
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub cover: Option<Cover>,

    /// Chapters in reading order
    #[serde(default)]
    pub chapters: Vec<Chapter>,

    #[serde(default)]
    pub structure: BookStructure,

    /// Only published books are shown in the merged catalog
    #[serde(default)]
    pub published: bool,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Create an empty draft titled "Untitled"
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: super::new_id(),
            title: "Untitled".to_string(),
            author: String::new(),
            cover: None,
            chapters: Vec::new(),
            structure: BookStructure::default(),
            published: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Position of a chapter in the reading order
    pub fn chapter_index(&self, chapter_id: &str) -> Option<usize> {
        self.chapters.iter().position(|c| c.id == chapter_id)
    }

    /// Title to show when the author left it blank
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(untitled)"
        } else {
            &self.title
        }
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

/// Field changes for an existing book; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub structure: Option<BookStructure>,
    pub published: Option<bool>,
}

impl BookPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn structure(mut self, structure: BookStructure) -> Self {
        self.structure = Some(structure);
        self
    }

    pub fn published(mut self, published: bool) -> Self {
        self.published = Some(published);
        self
    }

    pub(crate) fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title.trim().to_string();
        }
        if let Some(author) = self.author {
            book.author = author.trim().to_string();
        }
        if let Some(structure) = self.structure {
            book.structure = structure;
        }
        if let Some(published) = self.published {
            book.published = published;
        }
    }
}
