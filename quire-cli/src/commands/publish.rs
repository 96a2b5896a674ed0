//! Publish command implementations

use super::{explain, Workspace};
use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use quire_core::{BookPatch, CatalogEntry, PublishError};
use std::time::Duration;

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    Ok(pb)
}

/// Publish a draft's content and catalog entry
///
/// The draft is marked as published first so it shows up locally as well.
pub async fn publish(ws: &Workspace, id: &str) -> Result<()> {
    let publisher = ws.publisher()?;
    let mut book = ws.drafts.get(id).await.map_err(explain)?;
    if !book.published {
        book = ws
            .drafts
            .update_book(id, BookPatch::default().published(true))
            .await
            .map_err(explain)?;
        tracing::info!(id = %book.id, "marked '{}' as published", book.display_title());
    }

    let pb = spinner(&format!("Publishing '{}'...", book.display_title()))?;
    let result = publisher.publish_book(&book).await;
    pb.finish_and_clear();

    match result {
        Ok(publication) => {
            let verb = if publication.content.unchanged {
                "Already up to date"
            } else if publication.content.created {
                "Published"
            } else {
                "Updated"
            };
            println!(
                "{} '{}' at {} ({})",
                verb,
                book.display_title(),
                publication.content.path,
                publication.content.token
            );
            Ok(())
        }
        Err(PublishError::CatalogPending { entry, source, .. }) => Err(anyhow!(
            "'{}' is live at {} but the catalog was not updated: {} \
             (run `quire repair-catalog {}`)",
            entry.title,
            entry.path,
            source,
            id
        )),
        Err(PublishError::Content { source, .. }) => Err(explain(source)),
    }
}

/// Add the catalog entry for a published draft when it is missing
pub async fn repair_catalog(ws: &Workspace, id: &str) -> Result<()> {
    let publisher = ws.publisher()?;
    let book = ws.drafts.get(id).await.map_err(explain)?;
    if !book.published {
        return Err(anyhow!(
            "'{}' is not published (run `quire publish {}`)",
            book.display_title(),
            id
        ));
    }

    let pb = spinner("Checking catalog...")?;
    let needed = publisher.needs_catalog_repair(&book).await;
    let result = match needed {
        Ok(true) => {
            let entry = CatalogEntry::from_book(&book, publisher.content_path(&book));
            publisher.update_catalog(&entry).await.map(Some)
        }
        Ok(false) => Ok(None),
        Err(e) => Err(e),
    };
    pb.finish_and_clear();

    match result.map_err(explain)? {
        Some(report) => println!("Catalog entry restored in {}", report.path),
        None => println!("Nothing to repair"),
    }
    Ok(())
}
