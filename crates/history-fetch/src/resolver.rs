//! Repository resolution

use crate::api::{RemoteApi, RepoHandle};
use crate::error::FetchError;
use crate::retry::{RateLimitedRetrier, Sleeper, ThreadSleeper};

/// Resolves a repository name to a handle, retrying on rate limits.
///
/// Any other failure (bad credentials, unknown repository) is fatal.
pub struct RepositoryResolver<'a, A: ?Sized, S = ThreadSleeper> {
    api: &'a A,
    retrier: &'a RateLimitedRetrier<S>,
}

impl<'a, A: RemoteApi + ?Sized, S: Sleeper> RepositoryResolver<'a, A, S> {
    pub fn new(api: &'a A, retrier: &'a RateLimitedRetrier<S>) -> Self {
        Self { api, retrier }
    }

    pub fn resolve(&self, name: &str) -> Result<RepoHandle, FetchError> {
        let repo = self
            .retrier
            .execute("resolve repository", || self.api.resolve_repository(name))
            .map_err(|e| FetchError::from_retry("resolve repository", e))?;

        log::info!(
            "Resolved repository {} (default branch: {})",
            repo.full_name,
            repo.default_branch
        );
        Ok(repo)
    }
}
