//! History Fetch - Remote retrieval of a file's commit history
//!
//! This crate is responsible for:
//! - Talking to the hosting service (GitHub) behind the `RemoteApi` trait
//! - Retrying rate-limited calls with linear backoff
//! - Listing the commits that touched a file, oldest first
//! - Retrieving the file at each commit, with a tree/blob fallback for
//!   files the direct endpoint refuses
//! - Driving a full run and reducing the snapshots into change events

mod api;
mod config;
mod error;
mod fetcher;
mod formatting;
mod github;
mod resolver;
mod retry;
mod stats;
mod timeline;
mod walker;

pub use api::{ContentResponse, RemoteApi, RepoHandle, TreeEntry};
pub use config::WalkConfig;
pub use error::{ApiError, FetchError, RunAborted};
pub use fetcher::{ContentFetcher, FetchOutcome};
pub use github::GitHubClient;
pub use resolver::RepositoryResolver;
pub use retry::{RateLimitedRetrier, RetryError, RetryPolicy, Sleeper, ThreadSleeper, Throttled};
pub use stats::RunStats;
pub use timeline::{TimelineBuilder, TimelineReport};
pub use walker::CommitWalker;
