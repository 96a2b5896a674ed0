//! Export command implementation

use super::{explain, Workspace};
use anyhow::{Context, Result};
use std::path::Path;

/// Write a draft's zip archive into `output_dir` and print its path
pub async fn export(ws: &Workspace, id: &str, output_dir: &Path) -> Result<()> {
    let archive = ws.drafts.export_book(id).await.map_err(explain)?;

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let dir = output_dir.to_path_buf();
    let path = tokio::task::spawn_blocking(move || archive.save_to_dir(&dir))
        .await
        .context("Export task failed")?
        .map_err(explain)?;

    tracing::info!("Exported to {}", path.display());
    println!("{}", path.display());
    Ok(())
}
