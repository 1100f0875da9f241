//! GitHub REST API client
//!
//! Blocking client over `ureq`. Requests are issued one at a time; rate-limit
//! responses surface as [`ApiError::RateLimited`] and are retried by the
//! caller, never here.

use chrono::DateTime;
use data_encoding::BASE64;
use history_core::Commit;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Read;
use std::time::Duration;
use url::Url;

use crate::api::{ContentResponse, RemoteApi, RepoHandle, TreeEntry};
use crate::error::ApiError;

const COMMITS_PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct RepoPayload {
    full_name: String,
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct ContentsPayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    size: u64,
}

#[derive(Debug, Deserialize)]
struct CommitPayload {
    sha: String,
    commit: CommitDetails,
}

#[derive(Debug, Deserialize)]
struct CommitDetails {
    author: Option<Signature>,
    committer: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: String,
}

#[derive(Debug, Deserialize)]
struct TreePayload {
    tree: Vec<TreeEntryPayload>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntryPayload {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct BlobPayload {
    content: String,
    encoding: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
}

/// GitHub API client authenticated with a personal access token
pub struct GitHubClient {
    agent: ureq::Agent,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";

    /// Creates a client for the given API root (e.g. a GitHub Enterprise URL)
    pub fn new(token: Option<String>, api_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("config-history/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// API URL with `segments` appended to the base path, each one
    /// percent-encoded
    fn endpoint<I>(&self, segments: I) -> Result<Url, ApiError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| ApiError::Transport(format!("invalid API URL {}: {}", self.api_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("API URL {} cannot take a path", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `/repos/{owner}/{name}/...`
    fn repo_endpoint(&self, repo: &str, rest: &[&str]) -> Result<Url, ApiError> {
        self.endpoint(std::iter::once("repos").chain(repo.split('/')).chain(rest.iter().copied()))
    }

    /// `/repos/{owner}/{name}/contents/{path}`, keeping the path's `/` separators
    fn contents_endpoint(&self, repo: &str, path: &str) -> Result<Url, ApiError> {
        let mut rest = vec!["contents"];
        rest.extend(path.trim_start_matches('/').split('/'));
        self.repo_endpoint(repo, &rest)
    }

    fn get<T: DeserializeOwned>(&self, url: Url, query: &[(&str, &str)]) -> Result<T, ApiError> {
        log::debug!("GET {} {:?}", url, query);

        let mut request = self
            .agent
            .request_url("GET", &url)
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }
        for (name, value) in query {
            request = request.query(name, value);
        }

        match request.call() {
            Ok(response) => {
                let body = read_body(response)?;
                serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{}: {}", url.path(), e)))
            }
            Err(ureq::Error::Status(status, response)) => {
                let remaining = response.header("x-ratelimit-remaining").map(str::to_string);
                let body = read_body(response).unwrap_or_default();
                Err(classify_status(status, remaining.as_deref(), &body))
            }
            Err(ureq::Error::Transport(transport)) => Err(ApiError::Transport(transport.to_string())),
        }
    }
}

impl RemoteApi for GitHubClient {
    fn resolve_repository(&self, name: &str) -> Result<RepoHandle, ApiError> {
        let payload: RepoPayload = self.get(self.repo_endpoint(name, &[])?, &[])?;
        Ok(RepoHandle {
            full_name: payload.full_name,
            default_branch: payload.default_branch,
        })
    }

    fn get_contents(&self, repo: &RepoHandle, path: &str, revision: &str) -> Result<ContentResponse, ApiError> {
        let endpoint = self.contents_endpoint(&repo.full_name, path)?;
        match self.get::<serde_json::Value>(endpoint, &[("ref", revision)]) {
            Ok(value) => {
                // Directories come back as an array of entries
                let payload: ContentsPayload = serde_json::from_value(value)
                    .map_err(|_| ApiError::NotFound(format!("{} is not a file", path)))?;
                content_response(payload, path)
            }
            Err(ApiError::TooLarge(message)) => {
                log::debug!("{} at {} too large for contents API: {}", path, revision, message);
                Ok(ContentResponse::RequiresBlobLookup)
            }
            Err(error) => Err(error),
        }
    }

    fn list_commits_page(&self, repo: &RepoHandle, path: &str, from: &str, page: u32) -> Result<Vec<Commit>, ApiError> {
        let page = page.to_string();
        let per_page = COMMITS_PER_PAGE.to_string();
        let payload: Vec<CommitPayload> = self.get(
            self.repo_endpoint(&repo.full_name, &["commits"])?,
            &[("path", path), ("sha", from), ("per_page", per_page.as_str()), ("page", page.as_str())],
        )?;
        payload.into_iter().map(parse_commit).collect()
    }

    fn commits_per_page(&self) -> usize {
        COMMITS_PER_PAGE
    }

    fn get_tree(&self, repo: &RepoHandle, revision: &str, recursive: bool) -> Result<Vec<TreeEntry>, ApiError> {
        let endpoint = self.repo_endpoint(&repo.full_name, &["git", "trees", revision])?;
        let query: &[(&str, &str)] = if recursive { &[("recursive", "1")] } else { &[] };
        let payload: TreePayload = self.get(endpoint, query)?;
        if payload.truncated {
            log::warn!("Tree of {} was truncated by the API; lookup may miss the file", revision);
        }
        Ok(payload
            .tree
            .into_iter()
            .map(|entry| TreeEntry {
                path: entry.path,
                kind: entry.kind,
                sha: entry.sha,
            })
            .collect())
    }

    fn get_blob(&self, repo: &RepoHandle, sha: &str) -> Result<Vec<u8>, ApiError> {
        let payload: BlobPayload = self.get(self.repo_endpoint(&repo.full_name, &["git", "blobs", sha])?, &[])?;
        match payload.encoding.as_str() {
            "base64" => decode_base64(&payload.content),
            "utf-8" | "utf8" => Ok(payload.content.into_bytes()),
            other => Err(ApiError::Decode(format!("unsupported blob encoding '{}'", other))),
        }
    }
}

fn read_body(response: ureq::Response) -> Result<String, ApiError> {
    // into_string() caps bodies at 10 MB; blobs can be far larger
    let mut body = String::new();
    response
        .into_reader()
        .read_to_string(&mut body)
        .map_err(|e| ApiError::Transport(format!("failed to read response body: {}", e)))?;
    Ok(body)
}

/// Maps an error status to an [`ApiError`]
pub(crate) fn classify_status(status: u16, rate_limit_remaining: Option<&str>, body: &str) -> ApiError {
    let payload: ErrorPayload = serde_json::from_str(body).unwrap_or_default();
    let message = if payload.message.is_empty() {
        body.trim().to_string()
    } else {
        payload.message
    };
    let lower = message.to_ascii_lowercase();

    match status {
        429 => ApiError::RateLimited,
        403 if rate_limit_remaining == Some("0") || lower.contains("rate limit") => ApiError::RateLimited,
        403 if payload.errors.iter().any(|e| e.code == "too_large") || lower.contains("too large") => {
            ApiError::TooLarge(message)
        }
        401 => ApiError::Unauthorized(message),
        403 => ApiError::Forbidden(message),
        // 409: empty repository, 422: unknown commit
        404 | 409 | 422 => ApiError::NotFound(message),
        _ => ApiError::Http { status, message },
    }
}

fn content_response(payload: ContentsPayload, path: &str) -> Result<ContentResponse, ApiError> {
    if payload.kind != "file" {
        return Err(ApiError::NotFound(format!("{} is a {}, not a file", path, payload.kind)));
    }
    match (payload.encoding.as_deref(), payload.content.as_deref()) {
        (Some("base64"), Some(content)) if !content.is_empty() || payload.size == 0 => {
            decode_base64(content).map(ContentResponse::Served)
        }
        // Files between 1 and 100 MB: metadata only, encoding "none"
        _ => Ok(ContentResponse::RequiresBlobLookup),
    }
}

/// Decodes API base64, which is wrapped with newlines
fn decode_base64(content: &str) -> Result<Vec<u8>, ApiError> {
    let cleaned: Vec<u8> = content.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    BASE64
        .decode(&cleaned)
        .map_err(|e| ApiError::Decode(format!("invalid base64 content: {}", e)))
}

fn parse_commit(payload: CommitPayload) -> Result<Commit, ApiError> {
    let signature = payload
        .commit
        .author
        .or(payload.commit.committer)
        .ok_or_else(|| ApiError::Decode(format!("commit {} has no author date", payload.sha)))?;
    let date = DateTime::parse_from_rfc3339(&signature.date)
        .map_err(|e| ApiError::Decode(format!("commit {} date '{}': {}", payload.sha, signature.date, e)))?;
    Ok(Commit::new(payload.sha, date.timestamp()))
}
