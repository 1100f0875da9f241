//! Run configuration

use crate::retry::RetryPolicy;

/// What to walk and how to retry.
///
/// Built explicitly by the caller and handed to the timeline builder; nothing
/// is read from the environment here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkConfig {
    /// Repository in "owner/name" form
    pub repository: String,

    /// Path of the tracked file inside the repository
    pub path: String,

    /// Branch to walk; the repository's default branch when `None`
    pub branch: Option<String>,

    /// First revision to include
    pub since_revision: Option<String>,

    pub retry: RetryPolicy,
}

impl WalkConfig {
    pub fn new(repository: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            path: path.into(),
            branch: None,
            since_revision: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    pub fn with_since(mut self, since_revision: Option<String>) -> Self {
        self.since_revision = since_revision;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
