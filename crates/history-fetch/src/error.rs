//! Error types for history-fetch

use history_core::CoreError;

use crate::retry::{RetryError, Throttled};
use crate::timeline::TimelineReport;

/// What a single remote call can report
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Object too large to be served directly: {0}")]
    TooLarge(String),

    #[error("Bad credentials: {0}")]
    Unauthorized(String),

    #[error("Access forbidden: {0}")]
    Forbidden(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Authentication or authorization failure; never retried or recovered
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::Forbidden(_))
    }
}

impl Throttled for ApiError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited)
    }
}

/// Fatal errors that end a run
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Retries exhausted after {attempts} attempts during {operation}")]
    RetriesExhausted { operation: String, attempts: u32 },

    #[error("Authentication failed during {operation}: {source}")]
    Unauthorized { operation: String, source: ApiError },

    #[error("Remote call failed during {operation}: {source}")]
    Remote { operation: String, source: ApiError },

    #[error("Revision {0} is not in the history of the tracked file")]
    UnknownRevision(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl FetchError {
    /// Escalates the outcome of a retried call
    pub(crate) fn from_retry(operation: &str, error: RetryError<ApiError>) -> Self {
        match error {
            RetryError::Exhausted { attempts } => FetchError::RetriesExhausted {
                operation: operation.to_string(),
                attempts,
            },
            RetryError::Operation(source) if source.is_auth_failure() => FetchError::Unauthorized {
                operation: operation.to_string(),
                source,
            },
            RetryError::Operation(source) => FetchError::Remote {
                operation: operation.to_string(),
                source,
            },
        }
    }
}

/// A run that stopped on a fatal error.
///
/// `partial` holds the reduction of the commits processed before the failure.
#[derive(Debug, thiserror::Error)]
#[error("Run aborted after {} commits: {cause}", .partial.commits.len())]
pub struct RunAborted {
    #[source]
    pub cause: FetchError,
    pub partial: TimelineReport,
}
