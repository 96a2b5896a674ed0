//! Export of a draft book as a folder of Markdown chapters

use crate::error::{QuireError, Result};
use crate::types::Book;
use serde::{Deserialize, Serialize};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

/// Name of the manifest file inside the export folder
pub const MANIFEST_FILENAME: &str = "book.json";

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`
///
/// Empty input yields `"file"`.
pub fn sanitize_filename(name: &str) -> String {
    if name.is_empty() {
        return "file".to_string();
    }
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Filename of the chapter at `index` (0-based): `NN-<title>.md`
pub fn chapter_filename(index: usize, title: &str) -> String {
    let stem = if title.is_empty() { "chapter" } else { title };
    format!("{:02}-{}.md", index + 1, sanitize_filename(stem))
}

/// Archive name of the cover, kept clear of the manifest and chapter files
fn cover_filename(original: &str, chapters: &[ManifestChapter]) -> String {
    let mut name = sanitize_filename(original);
    if original.is_empty() || is_dot_name(&name) {
        name = "cover.jpg".to_string();
    }
    let taken = |n: &str| n == MANIFEST_FILENAME || chapters.iter().any(|c| c.filename == n);
    if taken(&name) {
        format!("cover-{}", name)
    } else {
        name
    }
}

// "." and ".." would resolve outside the export folder
fn is_dot_name(name: &str) -> bool {
    name.chars().all(|c| c == '.')
}

/// The `book.json` manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportManifest {
    pub title: String,
    pub author: String,
    pub chapters: Vec<ManifestChapter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestChapter {
    pub filename: String,
    pub title: String,
}

/// A single file of the bundle, relative to the export folder
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// A book bundled as manifest, cover and one Markdown file per chapter
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArchive {
    /// Folder all files live under inside the archive
    pub folder: String,

    pub manifest: ExportManifest,

    /// Manifest, cover (if any) and chapters, in that order
    pub files: Vec<ExportFile>,

    /// Suggested name of the zip file
    pub archive_name: String,
}

impl ExportArchive {
    /// Bundle a book using its current chapter order
    pub fn from_book(book: &Book) -> Result<Self> {
        let folder_stem = if book.title.is_empty() {
            &book.id
        } else {
            &book.title
        };
        let archive_stem = if book.title.is_empty() {
            "book"
        } else {
            &book.title
        };

        let manifest = ExportManifest {
            title: book.title.clone(),
            author: book.author.clone(),
            chapters: book
                .chapters
                .iter()
                .enumerate()
                .map(|(i, c)| ManifestChapter {
                    filename: chapter_filename(i, &c.title),
                    title: c.title.clone(),
                })
                .collect(),
        };

        let mut files = vec![ExportFile {
            name: MANIFEST_FILENAME.to_string(),
            data: serde_json::to_vec_pretty(&manifest)?,
        }];

        if let Some(cover) = &book.cover {
            files.push(ExportFile {
                name: cover_filename(&cover.filename, &manifest.chapters),
                data: cover.data.clone(),
            });
        }

        for (entry, chapter) in manifest.chapters.iter().zip(&book.chapters) {
            let body = if chapter.content.is_empty() {
                format!("# {}\n\n", chapter.title)
            } else {
                chapter.content.clone()
            };
            files.push(ExportFile {
                name: entry.filename.clone(),
                data: body.into_bytes(),
            });
        }

        let folder = match sanitize_filename(folder_stem) {
            name if is_dot_name(&name) => sanitize_filename(&book.id),
            name => name,
        };

        Ok(Self {
            folder,
            manifest,
            files,
            archive_name: format!("{}.zip", sanitize_filename(archive_stem)),
        })
    }

    /// Write the bundle as a zip archive
    pub fn write_zip<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = zip::ZipWriter::new(writer);
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        for file in &self.files {
            zip.start_file(format!("{}/{}", self.folder, file.name), options)
                .map_err(zip_error)?;
            zip.write_all(&file.data)
                .map_err(|e| QuireError::Serialization(e.to_string()))?;
        }

        zip.finish().map_err(zip_error)?;
        Ok(())
    }

    /// Zip archive as bytes
    pub fn to_zip_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        self.write_zip(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write `<archive_name>` into `dir`, returning its path
    pub fn save_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.archive_name);
        let file = std::fs::File::create(&path)
            .map_err(|e| QuireError::Serialization(format!("{}: {}", path.display(), e)))?;
        self.write_zip(std::io::BufWriter::new(file))?;
        Ok(path)
    }
}

fn zip_error(e: zip::result::ZipError) -> QuireError {
    QuireError::Serialization(format!("Failed to write zip: {}", e))
}
