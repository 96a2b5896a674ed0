//! Quire CLI - draft, export and publish books from the command line

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::Workspace;
use quire_core::{BookStructure, QuireConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse a 1-based chapter position
fn parse_position(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if n < 1 {
        Err("positions start at 1".to_string())
    } else {
        Ok(n)
    }
}

#[derive(Parser)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding local drafts (overrides QUIRE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Contents URL of the remote store (overrides QUIRE_CONTENTS_URL)
    #[arg(long, global = true)]
    remote: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new draft book
    New {
        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        author: Option<String>,
    },

    /// List draft books
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display a draft book
    Show {
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a draft's metadata
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        author: Option<String>,

        /// Book structure (flat, chapters)
        #[arg(short, long)]
        structure: Option<BookStructure>,

        /// Include the draft in the merged catalog
        #[arg(long)]
        published: Option<bool>,
    },

    /// Delete a draft book
    Delete { id: String },

    /// Set a draft's cover image
    Cover {
        id: String,

        /// Image file
        file: PathBuf,
    },

    /// Manage chapters of a draft
    Chapter {
        #[command(subcommand)]
        command: ChapterCommands,
    },

    /// Export a draft as a zip archive
    Export {
        id: String,

        /// Directory to write the archive to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Publish a draft to the remote store
    Publish { id: String },

    /// Add a published draft's entry to the remote catalog if it is missing
    RepairCatalog { id: String },

    /// Show the merged catalog
    Catalog {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ChapterCommands {
    /// Append a chapter
    Add { book: String, title: String },

    /// Edit a chapter's title or content
    Edit {
        book: String,
        chapter: String,

        #[arg(short, long)]
        title: Option<String>,

        /// Read the chapter body from a Markdown file
        #[arg(short, long)]
        content: Option<PathBuf>,
    },

    /// Delete a chapter
    Delete { book: String, chapter: String },

    /// Move a chapter to another position (1-based)
    Move {
        book: String,

        #[arg(value_parser = parse_position)]
        from: usize,

        #[arg(value_parser = parse_position)]
        to: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "quire_cli=debug,quire_core=debug"
    } else {
        "quire_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = QuireConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(url) = cli.remote {
        config = config.with_contents_url(url);
    }
    let ws = Workspace::open(config);

    match cli.command {
        Commands::New { title, author } => commands::new_book(&ws, title, author).await,
        Commands::List { json } => commands::list(&ws, json).await,
        Commands::Show { id, json } => commands::show(&ws, &id, json).await,
        Commands::Edit {
            id,
            title,
            author,
            structure,
            published,
        } => commands::edit(&ws, &id, title, author, structure, published).await,
        Commands::Delete { id } => commands::delete(&ws, &id).await,
        Commands::Cover { id, file } => commands::cover(&ws, &id, &file).await,
        Commands::Chapter { command } => match command {
            ChapterCommands::Add { book, title } => {
                commands::chapter_add(&ws, &book, &title).await
            }
            ChapterCommands::Edit {
                book,
                chapter,
                title,
                content,
            } => commands::chapter_edit(&ws, &book, &chapter, title, content).await,
            ChapterCommands::Delete { book, chapter } => {
                commands::chapter_delete(&ws, &book, &chapter).await
            }
            ChapterCommands::Move { book, from, to } => {
                commands::chapter_move(&ws, &book, from - 1, to - 1).await
            }
        },
        Commands::Export { id, output_dir } => commands::export(&ws, &id, &output_dir).await,
        Commands::Publish { id } => commands::publish(&ws, &id).await,
        Commands::RepairCatalog { id } => commands::repair_catalog(&ws, &id).await,
        Commands::Catalog { json } => commands::catalog(&ws, json).await,
    }
}
