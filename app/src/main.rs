#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use clap::{Parser, Subcommand};
use command::{
    CommandStrategy, ExplainInput, ExplainStrategy, InfoStrategy, InitStrategy, SearchInput,
    SearchStrategy, VersionStrategy,
};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "cardex")]
#[command(about = "Free-text search over a sports card catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog
    Search {
        /// Query text, e.g. "2020 bowman chrome kwan /99"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Maximum number of results (0 uses the configured default)
        #[arg(short = 'l', long, default_value_t = 0)]
        limit: usize,

        /// Entity types to return: all, cards, players, teams, series
        #[arg(short = 'c', long, default_value = "all")]
        category: String,

        /// JSON catalog file to search instead of the database
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Print lookup cache statistics after the search
        #[arg(long)]
        stats: bool,
    },
    /// Show how a query is understood without searching
    Explain {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// JSON catalog file to use instead of the database
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Show configuration
    Info,
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            query,
            limit,
            category,
            catalog,
            stats,
        } => {
            SearchStrategy
                .execute(SearchInput {
                    query: query.join(" "),
                    limit,
                    category,
                    catalog,
                    stats,
                })
                .await?;
        }
        Commands::Explain { query, catalog } => {
            ExplainStrategy
                .execute(ExplainInput {
                    query: query.join(" "),
                    catalog,
                })
                .await?;
        }
        Commands::Info => InfoStrategy.execute(()).await?,
        Commands::Init => InitStrategy.execute(()).await?,
        Commands::Version => VersionStrategy.execute(()).await?,
    }

    Ok(())
}
