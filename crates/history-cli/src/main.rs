//! Config-History CLI - Change timelines of JSON configuration files on GitHub
//!
//! Provides:
//! - Walking a file's commit history and reducing it to change events
//! - Showing the timeline of a single entity
//! - Listing, exporting and summarizing stored timelines

mod commands;
mod helpers;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use history_db::TimelineDb;
use history_fetch::{GitHubClient, RetryPolicy};
use std::path::PathBuf;

use commands::{cmd_export, cmd_list, cmd_show, cmd_stats, cmd_walk, WalkArgs};

#[derive(Parser)]
#[command(name = "config-history")]
#[command(about = "Change history of the entities in a JSON file tracked on GitHub", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the database
    #[arg(short, long, default_value = "./config-history.db")]
    database: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// How entities are read out of the tracked document
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Schema {
    /// Price-feed contracts keyed by address under "contracts"
    Contracts,
    /// Every member of --collection, nested objects flattened
    Flatten,
}

#[derive(Subcommand)]
enum Commands {
    /// Walks the history of a file and stores its change timeline
    Walk {
        /// Repository as "owner/name"
        #[arg(short, long, env = "GITHUB_REPO")]
        repo: String,

        /// Path of the tracked JSON file inside the repository
        #[arg(short, long, env = "GITHUB_FILE")]
        file: String,

        /// Branch to walk (default: the repository's default branch)
        #[arg(short, long, env = "GITHUB_BRANCH")]
        branch: Option<String>,

        /// Start the walk at this commit SHA or SHA prefix (inclusive)
        #[arg(long, env = "GITHUB_SINCE")]
        since: Option<String>,

        /// API token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// API base URL
        #[arg(long, env = "GITHUB_API_URL", default_value = GitHubClient::DEFAULT_API_URL)]
        api_url: String,

        /// Entity schema of the tracked file
        #[arg(short, long, value_enum, default_value = "contracts")]
        schema: Schema,

        /// Top-level collection holding the entities (flatten schema)
        #[arg(short, long, default_value = "contracts")]
        collection: String,

        /// Attempts per remote call while rate limited
        #[arg(long, default_value_t = RetryPolicy::DEFAULT_MAX_ATTEMPTS)]
        max_attempts: u32,

        /// Backoff unit in seconds; attempt n waits n times this long
        #[arg(long, default_value_t = RetryPolicy::DEFAULT_BASE_DELAY.as_secs())]
        retry_base_secs: u64,
    },

    /// Shows the change timeline of one entity
    Show {
        /// Entity key (e.g. a contract address)
        key: String,

        /// Maximum number of events to display (default: 50)
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,

        /// Show events since date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,

        /// Show all events (no limit)
        #[arg(short, long)]
        all: bool,
    },

    /// Lists stored entity keys
    List {
        /// Only keys starting with this prefix
        prefix: Option<String>,

        /// Only keys matching this regex
        #[arg(short, long)]
        pattern: Option<String>,
    },

    /// Exports all change events as JSON
    Export {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show database statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logger
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&cli.log_level)
    ).init();

    // Open database
    let db = TimelineDb::open(&cli.database)
        .with_context(|| format!("Failed to open database at {:?}", cli.database))?;

    match cli.command {
        Commands::Walk {
            repo,
            file,
            branch,
            since,
            token,
            api_url,
            schema,
            collection,
            max_attempts,
            retry_base_secs,
        } => {
            let args = WalkArgs {
                repo,
                file,
                branch,
                since,
                token,
                api_url,
                schema,
                collection,
                max_attempts,
                retry_base_secs,
            };
            cmd_walk(args, db)?;
        }
        Commands::Show { key, limit, since, all } => {
            cmd_show(key, limit, since, all, db)?;
        }
        Commands::List { prefix, pattern } => {
            cmd_list(prefix, pattern, db)?;
        }
        Commands::Export { output } => {
            cmd_export(output, db)?;
        }
        Commands::Stats => {
            cmd_stats(db)?;
        }
    }

    Ok(())
}
