//! Chapter type representing a single chapter of a draft book

use serde::{Deserialize, Serialize};

/// A single chapter of a book
///
/// Chapters carry no ordering field: their position in [`Book::chapters`](super::Book)
/// is the reading order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    /// Identifier, unique within the parent book
    pub id: String,

    /// Chapter title
    #[serde(default)]
    pub title: String,

    /// Free text body
    #[serde(default)]
    pub content: String,
}

impl Chapter {
    /// Create a new empty chapter with a fresh id
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: super::new_id(),
            title: title.into(),
            content: String::new(),
        }
    }

    /// Set the chapter body
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// Field changes for an existing chapter; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl ChapterPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub(crate) fn apply(self, chapter: &mut Chapter) {
        if let Some(title) = self.title {
            chapter.title = title.trim().to_string();
        }
        if let Some(content) = self.content {
            chapter.content = content;
        }
    }
}
