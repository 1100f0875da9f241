//! Commit history of the tracked file

use history_core::Commit;

use crate::api::{RemoteApi, RepoHandle};
use crate::error::FetchError;
use crate::retry::{RateLimitedRetrier, Sleeper, ThreadSleeper};

/// Lists the commits that modified a path, oldest first
pub struct CommitWalker<'a, A: ?Sized, S = ThreadSleeper> {
    api: &'a A,
    retrier: &'a RateLimitedRetrier<S>,
}

impl<'a, A: RemoteApi + ?Sized, S: Sleeper> CommitWalker<'a, A, S> {
    pub fn new(api: &'a A, retrier: &'a RateLimitedRetrier<S>) -> Self {
        Self { api, retrier }
    }

    /// Collects every commit touching `path` reachable from `from` (a branch
    /// or SHA), ordered by author time ascending.
    ///
    /// With `since`, the sequence starts at that revision (inclusive); a full
    /// SHA or an unambiguous prefix is accepted.
    pub fn list_commits(
        &self,
        repo: &RepoHandle,
        path: &str,
        from: &str,
        since: Option<&str>,
    ) -> Result<Vec<Commit>, FetchError> {
        let per_page = self.api.commits_per_page();
        let mut commits = Vec::new();
        for page in 1u32.. {
            let batch = self
                .retrier
                .execute("list commits", || self.api.list_commits_page(repo, path, from, page))
                .map_err(|e| FetchError::from_retry("list commits", e))?;
            let last_page = batch.len() < per_page.max(1);
            log::debug!("Commit page {}: {} commits", page, batch.len());
            commits.extend(batch);
            if last_page {
                break;
            }
        }

        // The API lists newest first; author dates need not be monotonic,
        // so sort after reversing. The sort is stable for equal timestamps.
        commits.reverse();
        commits.sort_by_key(|commit| commit.timestamp);

        if let Some(since) = since {
            let start = commits
                .iter()
                .position(|commit| !since.is_empty() && commit.sha.starts_with(since))
                .ok_or_else(|| FetchError::UnknownRevision(since.to_string()))?;
            commits.drain(..start);
        }

        Ok(commits)
    }
}
