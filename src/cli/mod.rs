//! CLI commands for tickerlens.
//!
//! Provides search, similar, history, suggest and config over a catalog file.

mod output;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::core::catalog::SharedCatalog;
use crate::core::search::SearchEngine;
use crate::services::catalog_loader::load_bundle;
use crate::services::market_data::MarketSnapshot;
use crate::services::storage::StateStore;
use crate::services::worker::{SearchWorker, WorkerOutcome};

/// How long the CLI waits for a worker answer.
const ANSWER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "tickerlens")]
#[command(about = "Symbol search and similarity ranking for stocks and ETFs", long_about = None)]
pub struct Cli {
    /// Catalog bundle to load (defaults to the configured path)
    #[arg(long, value_name = "PATH", global = true)]
    pub catalog: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search stocks and ETFs by free text
    Search {
        /// Query keywords
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// List instruments related to a symbol by shared tags
    Similar {
        symbol: String,

        /// Maximum number of results
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Show or edit the search history
    History {
        /// Remove one entry
        #[arg(long, value_name = "QUERY", conflicts_with = "clear")]
        remove: Option<String>,

        /// Remove every entry
        #[arg(long)]
        clear: bool,
    },

    /// Suggest past queries for a partial query
    Suggest {
        #[arg(default_value = "")]
        partial: String,

        /// Maximum number of suggestions
        #[arg(long, value_name = "N", default_value_t = 5)]
        limit: usize,
    },

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

/// Parse arguments and run the requested command.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load();

    let store = Arc::new(StateStore::open(config.data.state_file()));
    log::debug!("Search history at {}", store.path().display());
    let engine = SearchEngine::with_limits(
        store,
        config.search.history_limit,
        config.similarity.max_results,
    );

    match cli.command {
        Commands::Search { query } => {
            let (catalog, market) = load_catalog(cli.catalog, &config)?;
            let worker = SearchWorker::from_config(engine, catalog, &config)?;
            let ticket = worker.submit_search(&query.join(" "))?;
            match worker.wait_for(ticket.id, ANSWER_TIMEOUT)? {
                WorkerOutcome::Search(groups) => output::print_groups(&groups?, &market, cli.json)?,
                WorkerOutcome::Similar(_) => anyhow::bail!("Unexpected answer to search"),
            }
        }
        Commands::Similar { symbol, limit } => {
            let (catalog, _) = load_catalog(cli.catalog, &config)?;
            let worker = SearchWorker::from_config(engine, catalog, &config)?;
            let ticket = worker.submit_similar(&symbol)?;
            let mut related = match worker.wait_for(ticket.id, ANSWER_TIMEOUT)? {
                WorkerOutcome::Similar(related) => related?,
                WorkerOutcome::Search(_) => anyhow::bail!("Unexpected answer to similar"),
            };
            if let Some(limit) = limit {
                related.truncate(limit);
            }
            output::print_related(&symbol, &related, cli.json)?;
        }
        Commands::History { remove, clear } => {
            if clear {
                engine.clear_history();
            } else if let Some(query) = remove {
                engine.remove_history(&query);
            }
            output::print_lines(&engine.history(), cli.json)?;
        }
        Commands::Suggest { partial, limit } => {
            output::print_lines(&engine.suggestions(&partial, limit), cli.json)?;
        }
        Commands::Config { init } => {
            if init {
                config.save()?;
            }
            println!("# {}", Config::config_path().display());
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn load_catalog(
    path: Option<PathBuf>,
    config: &Config,
) -> anyhow::Result<(SharedCatalog, MarketSnapshot)> {
    let path = path.unwrap_or_else(|| config.data.catalog_file());
    let bundle = load_bundle(&path)
        .with_context(|| format!("Failed to load catalog {}", path.display()))?;

    let (index, market) = bundle.into_index();
    let catalog = SharedCatalog::new();
    catalog.install(index);
    Ok((catalog, market))
}
