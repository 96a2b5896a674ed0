//! Draft book commands

use super::{explain, Workspace};
use anyhow::{Context, Result};
use quire_core::{Book, BookPatch, BookStructure};
use serde::Serialize;
use std::path::Path;

/// Book summary for list output
#[derive(Serialize)]
struct BookSummary<'a> {
    id: &'a str,
    title: &'a str,
    author: &'a str,
    chapters: usize,
    published: bool,
}

impl<'a> From<&'a Book> for BookSummary<'a> {
    fn from(book: &'a Book) -> Self {
        Self {
            id: &book.id,
            title: book.display_title(),
            author: &book.author,
            chapters: book.chapters.len(),
            published: book.published,
        }
    }
}

/// Create a draft and print its id
pub async fn new_book(
    ws: &Workspace,
    title: Option<String>,
    author: Option<String>,
) -> Result<()> {
    let book = ws.drafts.create_book().await.map_err(explain)?;

    let mut patch = BookPatch::default();
    if let Some(title) = title {
        patch = patch.title(title);
    }
    if let Some(author) = author {
        patch = patch.author(author);
    }
    let book = ws.drafts.update_book(&book.id, patch).await.map_err(explain)?;

    tracing::info!("Created '{}'", book.display_title());
    println!("{}", book.id);
    Ok(())
}

pub async fn list(ws: &Workspace, json: bool) -> Result<()> {
    let books = ws.drafts.list().await.map_err(explain)?;
    let summaries: Vec<BookSummary> = books.iter().map(BookSummary::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No drafts yet. Create one with `quire new`.");
    }
    for s in &summaries {
        let marker = if s.published { " [published]" } else { "" };
        println!("{}  {} ({} chapters){}", s.id, s.title, s.chapters, marker);
    }
    Ok(())
}

pub async fn show(ws: &Workspace, id: &str, json: bool) -> Result<()> {
    let book = ws.drafts.get(id).await.map_err(explain)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&book)?);
        return Ok(());
    }

    println!("Title:       {}", book.display_title());
    if !book.author.is_empty() {
        println!("Author:      {}", book.author);
    }
    println!("Structure:   {}", book.structure.as_str());
    println!("Published:   {}", if book.published { "yes" } else { "no" });
    if let Some(cover) = &book.cover {
        println!("Cover:       {} ({} bytes)", cover.filename, cover.data.len());
    }
    println!("Updated:     {}", book.updated_at.to_rfc3339());
    println!("Chapters:    {}", book.chapters.len());
    for (i, chapter) in book.chapters.iter().enumerate() {
        println!("  {:>2}. {}  {}", i + 1, chapter.id, chapter.title);
    }
    Ok(())
}

pub async fn edit(
    ws: &Workspace,
    id: &str,
    title: Option<String>,
    author: Option<String>,
    structure: Option<BookStructure>,
    published: Option<bool>,
) -> Result<()> {
    let patch = BookPatch {
        title,
        author,
        structure,
        published,
    };
    let book = ws.drafts.update_book(id, patch).await.map_err(explain)?;
    tracing::info!("Updated '{}'", book.display_title());
    Ok(())
}

/// Deleting an unknown id is not an error
pub async fn delete(ws: &Workspace, id: &str) -> Result<()> {
    ws.drafts.delete_book(id).await.map_err(explain)?;
    tracing::info!("Deleted {}", id);
    Ok(())
}

pub async fn cover(ws: &Workspace, id: &str, file: &Path) -> Result<()> {
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read cover image: {}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let book = ws
        .drafts
        .set_cover(id, filename, data)
        .await
        .map_err(explain)?;
    tracing::info!("Set cover of '{}'", book.display_title());
    Ok(())
}
