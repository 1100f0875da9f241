//! Walk command implementation

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use history_core::{ContractExtractor, EntityExtractor, FlattenExtractor};
use history_db::{RunRecord, TimelineDb};
use history_fetch::{GitHubClient, RetryPolicy, TimelineBuilder, WalkConfig};
use std::time::Duration;

use crate::Schema;

/// Options of the walk command
pub struct WalkArgs {
    pub repo: String,
    pub file: String,
    pub branch: Option<String>,
    pub since: Option<String>,
    pub token: Option<String>,
    pub api_url: String,
    pub schema: Schema,
    pub collection: String,
    pub max_attempts: u32,
    pub retry_base_secs: u64,
}

/// Walks the file history and replaces the stored timeline
pub fn cmd_walk(args: WalkArgs, db: TimelineDb) -> Result<()> {
    if args.token.is_none() {
        log::warn!("No API token configured, unauthenticated rate limits apply");
    }

    let retry = RetryPolicy::new(args.max_attempts, Duration::from_secs(args.retry_base_secs));
    let config = WalkConfig::new(&args.repo, &args.file)
        .with_branch(args.branch)
        .with_since(args.since)
        .with_retry(retry);

    let extractor: Box<dyn EntityExtractor> = match args.schema {
        Schema::Contracts => Box::new(ContractExtractor),
        Schema::Flatten => Box::new(FlattenExtractor::new(&args.collection)),
    };

    log::info!("Starting walk of {}:{}", args.repo, args.file);
    log::info!(
        "Retry policy: {} attempts, {}s backoff unit",
        retry.max_attempts,
        retry.base_delay.as_secs()
    );

    let client = GitHubClient::new(args.token, args.api_url);
    let builder = TimelineBuilder::new(client, config);

    let report = match builder.run(extractor.as_ref()) {
        Ok(report) => report,
        Err(aborted) => {
            // The stored timeline is left as it was; a prefix would hide later history
            log::warn!(
                "Discarding partial timeline ({} events over {} commits)",
                aborted.partial.events.len(),
                aborted.partial.commits.len()
            );
            return Err(aborted).context("Walk failed");
        }
    };

    db.replace_events(&report.events)
        .context("Failed to store change events")?;
    db.record_run(&RunRecord {
        repository: report.repository.clone(),
        path: report.path.clone(),
        head_sha: report.head().map(|commit| commit.sha.clone()),
        recorded_at: Utc::now().timestamp(),
        commits: report.commits.len(),
        events: report.events.len(),
    })?;
    db.flush()?;

    println!("\n{} {}", "📜 Timeline:".bright_cyan(), format!("{}:{}", report.repository, report.path).bold());
    println!("{}", "━".repeat(60).bright_black());
    println!("  {}  {}", "Events:".bright_yellow(), report.events.len().to_string().green().bold());
    if let Some(head) = report.head() {
        println!("  {}    {}", "Head:".bright_yellow(), head);
    }
    println!("  {}   {}", "Stats:".bright_yellow(), report.stats);

    Ok(())
}
