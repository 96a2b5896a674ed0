//! Book-like records as shown in the merged catalog

use crate::types::{Book, BookStructure};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Maximum length (in characters) of a synthesized content excerpt
pub const EXCERPT_CHARS: usize = 400;

/// A book as listed in the catalog
///
/// Remote catalogs are loosely shaped, so every field is optional and
/// scalar fields accept numbers and booleans as text. Unknown fields, and
/// known fields whose value has an unexpected shape, are kept in `extra` and
/// written back unchanged.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CatalogRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Location of the content in the remote store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,

    /// Entries that are not JSON objects are skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<ChapterRecord>>,

    /// Raw body of legacy flat records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A chapter inside a [`CatalogRecord`]
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ChapterRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A chapter ready to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterView {
    pub title: String,
    pub excerpt: String,
}

impl CatalogRecord {
    /// Key used to de-duplicate records: id, slug, title, or a hash of the record
    pub fn identity_key(&self) -> String {
        [&self.id, &self.slug, &self.title]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| self.structural_hash())
    }

    /// SHA-256 of the record's canonical JSON
    pub fn structural_hash(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        format!("sha256:{}", hex::encode(Sha256::digest(&json)))
    }

    /// Case-insensitive title used for ordering; untitled sorts first
    pub fn sort_key(&self) -> String {
        self.title.as_deref().unwrap_or("").to_lowercase()
    }

    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => "Untitled",
        }
    }

    fn raw_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }

    /// Whether the record should be shown chapter by chapter
    ///
    /// Records that carry an explicit empty chapter list next to raw content
    /// count too, so they render through the synthesized "Content" chapter.
    pub fn is_chapter_based(&self) -> bool {
        let declared = self.structure.as_deref() == Some(BookStructure::Chapters.as_str());
        match &self.chapters {
            Some(chapters) if !chapters.is_empty() => true,
            Some(_) => declared || self.raw_content().is_some(),
            None => declared,
        }
    }

    /// Chapters to display; empty for records that are not chapter-based
    pub fn chapter_views(&self) -> Vec<ChapterView> {
        if !self.is_chapter_based() {
            return Vec::new();
        }

        let chapters = self.chapters.as_deref().unwrap_or_default();
        if chapters.is_empty() {
            return match self.raw_content() {
                Some(content) => vec![ChapterView {
                    title: "Content".to_string(),
                    excerpt: content.chars().take(EXCERPT_CHARS).collect(),
                }],
                None => Vec::new(),
            };
        }

        chapters
            .iter()
            .enumerate()
            .map(|(i, ch)| ChapterView {
                title: ch
                    .title
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| format!("Chapter {}", i + 1)),
                excerpt: ch
                    .excerpt
                    .clone()
                    .or_else(|| ch.content.clone())
                    .unwrap_or_default(),
            })
            .collect()
    }
}

impl From<&Book> for CatalogRecord {
    fn from(book: &Book) -> Self {
        let chapter_based =
            book.structure == BookStructure::Chapters || !book.chapters.is_empty();
        let chapters = chapter_based.then(|| {
            book.chapters
                .iter()
                .map(|c| ChapterRecord {
                    id: Some(c.id.clone()),
                    title: Some(c.title.clone()),
                    content: Some(c.content.clone()),
                    ..ChapterRecord::default()
                })
                .collect()
        });

        Self {
            id: Some(book.id.clone()),
            title: Some(book.title.clone()),
            author: Some(book.author.clone()),
            updated: Some(book.updated_at.to_rfc3339()),
            structure: Some(book.structure.as_str().to_string()),
            chapters,
            published: Some(book.published),
            ..Self::default()
        }
    }
}

impl From<Map<String, Value>> for CatalogRecord {
    fn from(map: Map<String, Value>) -> Self {
        let mut raw = RawFields(map);
        Self {
            id: raw.text("id"),
            slug: raw.text("slug"),
            title: raw.text("title"),
            author: raw.text("author"),
            path: raw.text("path"),
            updated: raw.text("updated"),
            structure: raw.text("structure"),
            chapters: raw.chapters("chapters"),
            content: raw.text("content"),
            description: raw.text("description"),
            url: raw.text("url"),
            published: raw.flag("published"),
            extra: raw.0,
        }
    }
}

impl From<Map<String, Value>> for ChapterRecord {
    fn from(map: Map<String, Value>) -> Self {
        let mut raw = RawFields(map);
        Self {
            id: raw.text("id"),
            title: raw.text("title"),
            content: raw.text("content"),
            excerpt: raw.text("excerpt"),
            extra: raw.0,
        }
    }
}

impl<'de> Deserialize<'de> for CatalogRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::<String, Value>::deserialize(deserializer).map(Self::from)
    }
}

impl<'de> Deserialize<'de> for ChapterRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::<String, Value>::deserialize(deserializer).map(Self::from)
    }
}

/// A raw JSON object that typed fields are taken out of
///
/// A value is only removed when it fits the field; whatever is left over
/// becomes the record's `extra`.
struct RawFields(Map<String, Value>);

impl RawFields {
    fn text(&mut self, key: &str) -> Option<String> {
        let text = match self.0.get(key)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        self.0.remove(key);
        Some(text)
    }

    fn flag(&mut self, key: &str) -> Option<bool> {
        let flag = self.0.get(key)?.as_bool()?;
        self.0.remove(key);
        Some(flag)
    }

    fn chapters(&mut self, key: &str) -> Option<Vec<ChapterRecord>> {
        if !self.0.get(key)?.is_array() {
            return None;
        }
        match self.0.remove(key) {
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(map) => Some(ChapterRecord::from(map)),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        }
    }
}
