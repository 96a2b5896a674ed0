//! Catalog command implementation

use super::Workspace;
use anyhow::Result;
use quire_core::Library;

/// Print the merged catalog: the remote library plus published drafts
pub async fn catalog(ws: &Workspace, json: bool) -> Result<()> {
    let source = ws.config.catalog_source(ws.remote());
    let library = Library::new(source, ws.drafts.clone());
    let records = library.merged_catalog().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("The catalog is empty.");
    }
    for record in &records {
        match record.author.as_deref().filter(|a| !a.is_empty()) {
            Some(author) => println!("{} by {}", record.display_title(), author),
            None => println!("{}", record.display_title()),
        }
        for (i, chapter) in record.chapter_views().iter().enumerate() {
            println!("  {:>2}. {}", i + 1, chapter.title);
        }
    }
    Ok(())
}
