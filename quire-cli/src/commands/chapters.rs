//! Chapter commands

use super::{explain, Workspace};
use anyhow::{Context, Result};
use quire_core::ChapterPatch;
use std::path::PathBuf;

/// Append a chapter and print its id
pub async fn chapter_add(ws: &Workspace, book: &str, title: &str) -> Result<()> {
    let chapter = ws.drafts.add_chapter(book, title).await.map_err(explain)?;
    println!("{}", chapter.id);
    Ok(())
}

pub async fn chapter_edit(
    ws: &Workspace,
    book: &str,
    chapter: &str,
    title: Option<String>,
    content: Option<PathBuf>,
) -> Result<()> {
    let mut patch = ChapterPatch::default();
    if let Some(title) = title {
        patch = patch.title(title);
    }
    if let Some(path) = content {
        let body = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read chapter content: {}", path.display()))?;
        patch = patch.content(body);
    }

    let chapter = ws
        .drafts
        .update_chapter(book, chapter, patch)
        .await
        .map_err(explain)?;
    tracing::info!("Updated chapter '{}'", chapter.title);
    Ok(())
}

pub async fn chapter_delete(ws: &Workspace, book: &str, chapter: &str) -> Result<()> {
    ws.drafts
        .delete_chapter(book, chapter)
        .await
        .map_err(explain)?;
    tracing::info!("Deleted chapter {}", chapter);
    Ok(())
}

/// Positions are 0-based here; out-of-range moves change nothing
pub async fn chapter_move(ws: &Workspace, book: &str, from: usize, to: usize) -> Result<()> {
    ws.drafts
        .move_chapter(book, from, to)
        .await
        .map_err(explain)?;
    Ok(())
}
