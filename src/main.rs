use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use procflow::config::AppConfig;
use procflow::errors::DiagramError;
use procflow::server;
use procflow::services::diagram_io_service;
use procflow::storage::{DiagramStorage, LocalStorage};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    /// Path to a procflow.toml settings file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the diagram API server
    Serve {
        #[clap(short, long)]
        port: Option<u16>,
        #[clap(short, long)]
        data_dir: Option<PathBuf>,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    /// List saved diagrams
    List {
        #[clap(short, long)]
        data_dir: Option<PathBuf>,
        /// Show only autosaved drafts
        #[clap(long)]
        drafts: bool,
    },
    /// Export a diagram to a standalone JSON document
    Export {
        id: String,
        /// Directory to write the document into
        #[clap(short, long, default_value = ".")]
        output: PathBuf,
        #[clap(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Import a diagram document into storage
    Import {
        file: PathBuf,
        #[clap(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Delete a saved diagram
    Delete {
        id: String,
        #[clap(short, long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve {
            port,
            data_dir,
            cors_origin,
        } => {
            let port = port.unwrap_or(config.port);
            let data_dir = data_dir.unwrap_or_else(|| config.data_dir.clone());
            let cors = cors_origin.or_else(|| config.cors_origin.clone());
            server::start_server(port, &data_dir, cors.as_deref()).await?;
        }
        Commands::List { data_dir, drafts } => {
            let storage = open_storage(data_dir, &config);
            let mut diagrams = storage.list().await?;
            if drafts {
                diagrams.retain(|d| d.is_draft);
            }
            if diagrams.is_empty() {
                println!("No saved diagrams");
            }
            for diagram in diagrams {
                let updated = diagram
                    .updated_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                let marker = if diagram.is_draft { " [draft]" } else { "" };
                println!(
                    "{}  {}{}  ({} nodes, {} edges, updated {})",
                    diagram.id,
                    diagram.title,
                    marker,
                    diagram.nodes.len(),
                    diagram.edges.len(),
                    updated
                );
            }
        }
        Commands::Export {
            id,
            output,
            data_dir,
        } => {
            let storage = open_storage(data_dir, &config);
            let diagram = storage
                .get(&id)
                .await?
                .ok_or_else(|| anyhow!(DiagramError::NotFound(id.clone())))?;
            let path = diagram_io_service::export_diagram(&diagram, &output)?;
            println!("Exported {} to {}", id, path.display());
        }
        Commands::Import { file, data_dir } => {
            let storage = open_storage(data_dir, &config);
            let diagram = diagram_io_service::import_diagram(&file)?;
            let saved = storage.upsert(diagram).await?;
            println!("Imported diagram {} ({})", saved.id, saved.title);
        }
        Commands::Delete { id, data_dir } => {
            let storage = open_storage(data_dir, &config);
            storage.remove(&id).await?;
            info!("Deleted diagram {}", id);
            println!("Deleted {}", id);
        }
    }

    Ok(())
}

fn open_storage(data_dir: Option<PathBuf>, config: &AppConfig) -> LocalStorage {
    LocalStorage::new(data_dir.unwrap_or_else(|| config.data_dir.clone()))
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.to_string()))
        .without_time()
        .init();
}
