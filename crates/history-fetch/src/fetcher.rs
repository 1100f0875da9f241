//! File content retrieval at a revision
//!
//! Two paths, tried in order:
//! 1. the contents endpoint, which serves small files directly;
//! 2. a tree lookup for the file's blob address followed by a blob fetch,
//!    used when the direct path refuses the file (e.g. it is too large).
//!
//! Missing files and undecodable content both yield [`FetchOutcome::NotFound`];
//! the caller skips the commit. Only exhausted retries, authentication
//! failures and unexpected fallback failures are errors.

use history_core::Document;

use crate::api::{ContentResponse, RemoteApi, RepoHandle};
use crate::error::{ApiError, FetchError};
use crate::retry::{RateLimitedRetrier, RetryError, Sleeper, ThreadSleeper};

/// Content of the tracked file at one revision
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(Document),
    NotFound,
}

pub struct ContentFetcher<'a, A: ?Sized, S = ThreadSleeper> {
    api: &'a A,
    retrier: &'a RateLimitedRetrier<S>,
}

impl<'a, A: RemoteApi + ?Sized, S: Sleeper> ContentFetcher<'a, A, S> {
    pub fn new(api: &'a A, retrier: &'a RateLimitedRetrier<S>) -> Self {
        Self { api, retrier }
    }

    /// Fetches and decodes `path` as of `revision`
    pub fn fetch(&self, repo: &RepoHandle, path: &str, revision: &str) -> Result<FetchOutcome, FetchError> {
        let direct = self
            .retrier
            .execute("get contents", || self.api.get_contents(repo, path, revision));

        match direct {
            Ok(ContentResponse::Served(bytes)) => Ok(decode(&bytes, path, revision)),
            Ok(ContentResponse::RequiresBlobLookup) => {
                log::info!("{} at {} cannot be served directly, looking up its blob", path, short(revision));
                self.fetch_via_tree(repo, path, revision)
            }
            Err(RetryError::Operation(ApiError::NotFound(message))) => {
                log::info!("Cannot read {} at {}: {}", path, short(revision), message);
                Ok(FetchOutcome::NotFound)
            }
            Err(RetryError::Operation(error)) if !error.is_auth_failure() => {
                log::warn!(
                    "Direct fetch of {} at {} failed ({}), falling back to tree lookup",
                    path,
                    short(revision),
                    error
                );
                self.fetch_via_tree(repo, path, revision)
            }
            Err(error) => Err(FetchError::from_retry("get contents", error)),
        }
    }

    fn fetch_via_tree(&self, repo: &RepoHandle, path: &str, revision: &str) -> Result<FetchOutcome, FetchError> {
        // Nested paths only show up in a recursive listing
        let recursive = path.contains('/');
        let entries = match self
            .retrier
            .execute("get tree", || self.api.get_tree(repo, revision, recursive))
        {
            Ok(entries) => entries,
            Err(RetryError::Operation(ApiError::NotFound(message))) => {
                log::info!("No tree for {}: {}", short(revision), message);
                return Ok(FetchOutcome::NotFound);
            }
            Err(error) => return Err(FetchError::from_retry("get tree", error)),
        };

        let Some(entry) = entries.iter().find(|entry| entry.path == path && entry.is_blob()) else {
            log::info!("Cannot find blob for {} in tree of {}", path, short(revision));
            return Ok(FetchOutcome::NotFound);
        };

        let bytes = match self
            .retrier
            .execute("get blob", || self.api.get_blob(repo, &entry.sha))
        {
            Ok(bytes) => bytes,
            Err(RetryError::Operation(ApiError::NotFound(message))) => {
                log::info!("Blob {} for {} is missing: {}", entry.sha, path, message);
                return Ok(FetchOutcome::NotFound);
            }
            Err(error) => return Err(FetchError::from_retry("get blob", error)),
        };

        Ok(decode(&bytes, path, revision))
    }
}

fn decode(bytes: &[u8], path: &str, revision: &str) -> FetchOutcome {
    match Document::from_slice(bytes) {
        Ok(document) => FetchOutcome::Found(document),
        Err(e) => {
            log::info!("Cannot decode {} at {}: {}", path, short(revision), e);
            FetchOutcome::NotFound
        }
    }
}

fn short(revision: &str) -> &str {
    revision.get(..8).unwrap_or(revision)
}
