//! hybridsearch - hybrid dense/sparse search from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Index a corpus (one document per line, or JSON Lines with a "text" field)
//! hybridsearch index --corpus docs.txt
//!
//! # Search it
//! hybridsearch search "What is BM25?" -k 5
//! hybridsearch search "sparse vectors" --fusion rrf --no-rerank --json
//!
//! # Print the SQL for the external vector extension
//! hybridsearch sql
//! ```

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use config::{LogFormat, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hybridsearch", version, about = "Hybrid dense/sparse vector search")]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, global = true, env = "HYBRIDSEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a corpus and write a store snapshot
    Index {
        /// Corpus file: one document per line, or JSON Lines when it ends in .jsonl
        #[arg(long)]
        corpus: PathBuf,

        /// Snapshot directory (overrides [store] data_dir)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Query a store snapshot
    Search {
        /// Search query
        query: String,

        /// Snapshot directory (overrides [store] data_dir)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Results per vector column (overrides [retrieval] dense_k and sparse_k)
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<usize>,

        /// Candidate pool ordering before reranking
        #[arg(long, value_enum)]
        fusion: Option<FusionArg>,

        /// Skip the reranking stage
        #[arg(long)]
        no_rerank: bool,

        /// Output the full outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the statements that set up and query the external vector extension
    Sql,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FusionArg {
    Union,
    Rrf,
}

fn init_logging(settings: &Settings, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        settings.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    match settings.logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    init_logging(&settings, cli.verbose);

    match cli.command {
        Commands::Index { corpus, data_dir } => commands::index(&settings, &corpus, data_dir),
        Commands::Search {
            query,
            data_dir,
            top_k,
            fusion,
            no_rerank,
            json,
        } => commands::search(
            &settings,
            &query,
            commands::SearchOptions {
                data_dir,
                top_k,
                fusion,
                rerank: !no_rerank,
                json,
            },
        ),
        Commands::Sql => {
            println!("{}", commands::sql_script(&settings));
            Ok(())
        }
    }
}
