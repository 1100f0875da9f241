//! Timeline construction
//!
//! Drives one run: resolve the repository, list the commits touching the
//! tracked file, fetch and extract the file at each commit in order, and
//! reduce the snapshots into change events. Commits are processed strictly
//! one at a time; the only waits are retry backoffs.

use history_core::{ChangeEvent, ChangeSetReducer, Commit, EntityExtractor};
use std::time::Instant;

use crate::api::RemoteApi;
use crate::config::WalkConfig;
use crate::error::{FetchError, RunAborted};
use crate::fetcher::{ContentFetcher, FetchOutcome};
use crate::formatting::{format_duration, format_number, format_unix_timestamp};
use crate::resolver::RepositoryResolver;
use crate::retry::{RateLimitedRetrier, Sleeper, ThreadSleeper};
use crate::stats::RunStats;
use crate::walker::CommitWalker;

/// Result of a run
#[derive(Debug, Clone)]
pub struct TimelineReport {
    pub repository: String,
    pub path: String,
    /// Commits walked, oldest first (including skipped ones)
    pub commits: Vec<Commit>,
    /// Reduced change events, ordered by key then time
    pub events: Vec<ChangeEvent>,
    pub stats: RunStats,
}

impl TimelineReport {
    /// Most recent commit walked
    pub fn head(&self) -> Option<&Commit> {
        self.commits.last()
    }
}

/// Accumulated state of a run in progress
#[derive(Default)]
struct Progress {
    stats: RunStats,
    reducer: ChangeSetReducer,
    commits: Vec<Commit>,
}

/// Builds the change timeline of one file
pub struct TimelineBuilder<A, S = ThreadSleeper> {
    api: A,
    retrier: RateLimitedRetrier<S>,
    config: WalkConfig,
}

impl<A: RemoteApi> TimelineBuilder<A> {
    pub fn new(api: A, config: WalkConfig) -> Self {
        Self::with_sleeper(api, config, ThreadSleeper)
    }
}

impl<A: RemoteApi, S: Sleeper> TimelineBuilder<A, S> {
    /// Creates a builder with a custom sleep capability (used by tests)
    pub fn with_sleeper(api: A, config: WalkConfig, sleeper: S) -> Self {
        let retrier = RateLimitedRetrier::with_sleeper(config.retry, sleeper);
        Self { api, retrier, config }
    }

    /// Runs the walk and reduces the result.
    ///
    /// On a fatal error the returned [`RunAborted`] carries the reduction of
    /// every commit processed before the failure.
    pub fn run<E: EntityExtractor + ?Sized>(&self, extractor: &E) -> Result<TimelineReport, RunAborted> {
        let start_time = Instant::now();
        let mut progress = Progress::default();

        let outcome = self.walk(extractor, &mut progress);

        let Progress { mut stats, reducer, commits } = progress;
        let mut report = TimelineReport {
            repository: self.config.repository.clone(),
            path: self.config.path.clone(),
            commits,
            events: Vec::new(),
            stats: RunStats::default(),
        };

        match reducer.finish() {
            Ok(events) => report.events = events,
            Err(e) => {
                return Err(RunAborted {
                    cause: FetchError::Core(e),
                    partial: report,
                })
            }
        }

        stats.events = report.events.len();
        stats.elapsed_time = start_time.elapsed();
        report.stats = stats;

        match outcome {
            Ok(()) => {
                log_summary(&report);
                Ok(report)
            }
            Err(cause) => {
                log::error!(
                    "Run aborted after {} of {} commits: {}",
                    format_number(report.commits.len()),
                    format_number(report.stats.commits_listed),
                    cause
                );
                Err(RunAborted {
                    cause,
                    partial: report,
                })
            }
        }
    }

    fn walk<E: EntityExtractor + ?Sized>(&self, extractor: &E, progress: &mut Progress) -> Result<(), FetchError> {
        let path = self.config.path.as_str();

        let repo = RepositoryResolver::new(&self.api, &self.retrier).resolve(&self.config.repository)?;
        let branch = self
            .config
            .branch
            .clone()
            .unwrap_or_else(|| repo.default_branch.clone());

        log::info!("Listing commits touching {} on {}", path, branch);
        let commits = CommitWalker::new(&self.api, &self.retrier).list_commits(
            &repo,
            path,
            &branch,
            self.config.since_revision.as_deref(),
        )?;
        progress.stats.commits_listed = commits.len();

        match (commits.first(), commits.last()) {
            (Some(first), Some(last)) => log::info!(
                "Found {} commits ({} .. {})",
                format_number(commits.len()),
                format_unix_timestamp(first.timestamp),
                format_unix_timestamp(last.timestamp)
            ),
            _ => log::info!("No commits found for {}", path),
        }

        let fetcher = ContentFetcher::new(&self.api, &self.retrier);
        let total = commits.len();

        for (index, commit) in commits.into_iter().enumerate() {
            log::info!("[{}/{}] Processing commit {}", index + 1, total, commit);

            match fetcher.fetch(&repo, path, &commit.sha)? {
                FetchOutcome::Found(document) => {
                    let snapshots = extractor.extract(&document, &commit);
                    log::debug!("{} entities at {}", snapshots.len(), commit.short_sha());
                    progress.stats.snapshots += snapshots.len();
                    progress.stats.commits_processed += 1;
                    progress.reducer.extend(snapshots);
                }
                FetchOutcome::NotFound => {
                    log::info!("Skipping commit {}: {} missing or unreadable", commit.short_sha(), path);
                    progress.stats.commits_skipped += 1;
                }
            }

            progress.commits.push(commit);
        }

        Ok(())
    }
}

fn log_summary(report: &TimelineReport) {
    let stats = &report.stats;
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("✅ Timeline completed for {}:{}", report.repository, report.path);
    log::info!("   • Total time:        {}", format_duration(stats.elapsed_time));
    log::info!(
        "   • Commits:           {} ({} processed, {} skipped)",
        format_number(stats.commits_listed),
        format_number(stats.commits_processed),
        format_number(stats.commits_skipped)
    );
    log::info!("   • Snapshots:         {}", format_number(stats.snapshots));
    log::info!(
        "   • Change events:     {} ({} unchanged snapshots collapsed)",
        format_number(stats.events),
        format_number(stats.snapshots.saturating_sub(stats.events))
    );
}
