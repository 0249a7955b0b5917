mod agent;
mod cli;
mod config;
mod embedding;
mod error;
mod knowledge;
mod memory;
mod vector;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tandem",
    version,
    about = "Knowledge and memory context engine for an AI pair-programming assistant"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a workspace directory into the knowledge base
    Scan {
        path: PathBuf,
        /// Only scan the top level, skipping subdirectories
        #[arg(long)]
        shallow: bool,
    },
    /// Run one conversational turn
    Ask { text: String },
    /// Query the knowledge base
    Query {
        text: String,
        #[arg(short)]
        k: Option<usize>,
        #[arg(long)]
        category: Option<String>,
        /// Restrict to items carrying any of these tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        threshold: Option<f32>,
    },
    /// Retrieve relevant memories
    Recall {
        text: String,
        #[arg(short)]
        k: Option<usize>,
        #[arg(long)]
        kind: Option<String>,
        /// Only consider memories recorded within this many seconds
        #[arg(long)]
        window: Option<f64>,
    },
    /// Show knowledge base and memory statistics
    Stats,
    /// Clear memories, optionally only one kind
    Clear {
        #[arg(long)]
        kind: Option<String>,
    },
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.tandem/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::TandemConfig::load()?;

    // Log to stderr so stdout stays clean for command output.
    let filter = EnvFilter::try_new(&config.agent.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Scan { path, shallow } => {
            cli::scan::scan(&config, &path, !shallow).await?;
        }
        Command::Ask { text } => {
            cli::ask::ask(&config, &text).await?;
        }
        Command::Query {
            text,
            k,
            category,
            tags,
            threshold,
        } => {
            cli::query::query(&config, &text, k, category, tags, threshold).await?;
        }
        Command::Recall {
            text,
            k,
            kind,
            window,
        } => {
            cli::recall::recall(&config, &text, k, kind, window).await?;
        }
        Command::Stats => {
            cli::stats::stats(&config)?;
        }
        Command::Clear { kind } => {
            cli::clear::clear(&config, kind)?;
        }
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model_download(&config.embedding).await?;
            }
        },
    }

    Ok(())
}
