//! Remote version-control API seam
//!
//! Everything the timeline needs from the hosting service goes through
//! [`RemoteApi`], so the retrieval logic can run against GitHub or an
//! in-memory double.

use history_core::Commit;

use crate::error::ApiError;

/// Resolved repository handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoHandle {
    /// "owner/name"
    pub full_name: String,

    /// Branch used when no branch is configured
    pub default_branch: String,
}

/// Result of a direct content request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentResponse {
    /// The service returned the file bytes
    Served(Vec<u8>),

    /// The service refuses to serve the file directly (e.g. it is too large);
    /// it has to be located in the tree and fetched as a blob
    RequiresBlobLookup,
}

/// One entry of a revision's file tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path relative to the repository root
    pub path: String,

    /// Object type as reported by the service ("blob", "tree", "commit")
    pub kind: String,

    /// Content address of the object
    pub sha: String,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }
}

/// Capabilities of the hosting service used by the timeline
pub trait RemoteApi {
    /// Resolves "owner/name" to a repository handle
    fn resolve_repository(&self, name: &str) -> Result<RepoHandle, ApiError>;

    /// Requests the content of `path` at `revision`
    fn get_contents(&self, repo: &RepoHandle, path: &str, revision: &str) -> Result<ContentResponse, ApiError>;

    /// Lists one page (1-based) of commits touching `path`, reachable from
    /// `from`, newest first. A page shorter than [`commits_per_page`]
    /// is the last one.
    ///
    /// [`commits_per_page`]: RemoteApi::commits_per_page
    fn list_commits_page(&self, repo: &RepoHandle, path: &str, from: &str, page: u32) -> Result<Vec<Commit>, ApiError>;

    /// Size of a full commit page
    fn commits_per_page(&self) -> usize {
        100
    }

    /// Lists the file tree of `revision`
    fn get_tree(&self, repo: &RepoHandle, revision: &str, recursive: bool) -> Result<Vec<TreeEntry>, ApiError>;

    /// Fetches raw blob content by content address
    fn get_blob(&self, repo: &RepoHandle, sha: &str) -> Result<Vec<u8>, ApiError>;
}

impl<T: RemoteApi + ?Sized> RemoteApi for &T {
    fn resolve_repository(&self, name: &str) -> Result<RepoHandle, ApiError> {
        (**self).resolve_repository(name)
    }

    fn get_contents(&self, repo: &RepoHandle, path: &str, revision: &str) -> Result<ContentResponse, ApiError> {
        (**self).get_contents(repo, path, revision)
    }

    fn list_commits_page(&self, repo: &RepoHandle, path: &str, from: &str, page: u32) -> Result<Vec<Commit>, ApiError> {
        (**self).list_commits_page(repo, path, from, page)
    }

    fn commits_per_page(&self) -> usize {
        (**self).commits_per_page()
    }

    fn get_tree(&self, repo: &RepoHandle, revision: &str, recursive: bool) -> Result<Vec<TreeEntry>, ApiError> {
        (**self).get_tree(repo, revision, recursive)
    }

    fn get_blob(&self, repo: &RepoHandle, sha: &str) -> Result<Vec<u8>, ApiError> {
        (**self).get_blob(repo, sha)
    }
}
