//! Error types for history-core

/// Errors specific to history-core
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Failed to serialize entity fields: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}
