use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docsplit_infrastructure::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "docsplit")]
#[command(about = "docsplit - review and finalize AI-split document bundles", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file, overrides the configured path
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and schema if they do not exist
    Init,
    /// Store a split described by a JSON file ("-" reads stdin)
    Ingest { file: PathBuf },
    /// Print a split
    Show { split_id: String },
    /// List a client's splits, newest first
    List { client_id: String },
    /// Change a document's name, classification or description
    Rename {
        document_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        classification: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Move pages from one document to another
    Move {
        split_id: String,
        from_document_id: String,
        to_document_id: String,
        #[arg(required = true)]
        page_ids: Vec<String>,
    },
    /// Create a document from unassigned pages
    Create {
        split_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        classification: String,
        #[arg(long)]
        filename: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(required = true)]
        page_ids: Vec<String>,
    },
    /// Assign unassigned pages to an existing document
    Assign {
        split_id: String,
        document_id: String,
        #[arg(required = true)]
        page_ids: Vec<String>,
    },
    /// Remove a document and return its pages to the unassigned pool
    DeleteDocument { document_id: String },
    /// Lock a split against further edits
    Finalize { split_id: String },
    /// Render a document to a file
    Download {
        document_id: String,
        /// Output path (defaults to the document's filename)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete a split with all of its documents and pages
    Delete { split_id: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::load_default().context("Failed to load config")?,
    };
    if let Some(database) = &cli.database {
        config.database.path = database.clone();
    }
    tracing::debug!("[CLI] Using database {}", config.database.path.display());
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Opening the service creates the database and schema when missing.
    let service = commands::open_service(&config).await?;
    match cli.command {
        Commands::Init => commands::init::run(&config)?,
        Commands::Ingest { file } => commands::split::ingest(&service, &file).await?,
        Commands::Show { split_id } => commands::split::show(&service, &split_id).await?,
        Commands::List { client_id } => commands::split::list(&service, &client_id).await?,
        Commands::Rename {
            document_id,
            name,
            classification,
            description,
        } => {
            commands::document::rename(&service, &document_id, name, classification, description)
                .await?
        }
        Commands::Move {
            split_id,
            from_document_id,
            to_document_id,
            page_ids,
        } => {
            commands::document::move_pages(
                &service,
                &split_id,
                &from_document_id,
                &to_document_id,
                &page_ids,
            )
            .await?
        }
        Commands::Create {
            split_id,
            name,
            classification,
            filename,
            description,
            page_ids,
        } => {
            let draft = docsplit_core::split::DocumentDraft {
                name,
                classification,
                filename,
                short_description: description,
            };
            commands::document::create(&service, &split_id, draft, &page_ids).await?
        }
        Commands::Assign {
            split_id,
            document_id,
            page_ids,
        } => commands::document::assign(&service, &split_id, &document_id, &page_ids).await?,
        Commands::DeleteDocument { document_id } => {
            commands::document::delete(&service, &document_id).await?
        }
        Commands::Finalize { split_id } => commands::split::finalize(&service, &split_id).await?,
        Commands::Download { document_id, out } => {
            commands::document::download(&service, &document_id, out).await?
        }
        Commands::Delete { split_id } => commands::split::delete(&service, &split_id).await?,
    }

    Ok(())
}
