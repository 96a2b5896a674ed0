//! Error types for Quire Core

use std::time::Duration;
use thiserror::Error;

/// Result type alias using QuireError
pub type Result<T> = std::result::Result<T, QuireError>;

/// Top-level error type for all Quire operations
#[derive(Debug, Error)]
pub enum QuireError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {path} was changed remotely since it was read")]
    Conflict { path: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Remote rejected the request ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Coarse classification of a [`QuireError`], stable enough to branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Transport,
    Serialization,
    Remote,
    Timeout,
}

impl QuireError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuireError::NotFound(_) => ErrorKind::NotFound,
            QuireError::Validation(_) => ErrorKind::Validation,
            QuireError::Conflict { .. } => ErrorKind::Conflict,
            QuireError::Transport(_) => ErrorKind::Transport,
            QuireError::Serialization(_) | QuireError::Storage(_) => ErrorKind::Serialization,
            QuireError::Remote { .. } => ErrorKind::Remote,
            QuireError::Timeout(_) => ErrorKind::Timeout,
        }
    }

    /// Short user-facing hint on how to recover from this failure
    pub fn remedy(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Conflict => "the remote copy changed; reload and retry",
            ErrorKind::Transport => "network error; check your connection and retry",
            ErrorKind::Timeout => "the remote did not answer in time; retry later",
            ErrorKind::Remote => "the remote refused the change; check your access token",
            ErrorKind::Validation => "fix the highlighted input and retry",
            ErrorKind::NotFound => "the item no longer exists; refresh the view",
            ErrorKind::Serialization => "local storage could not be written; free space and retry",
        }
    }
}

impl From<serde_json::Error> for QuireError {
    fn from(e: serde_json::Error) -> Self {
        QuireError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for QuireError {
    fn from(e: reqwest::Error) -> Self {
        QuireError::Transport(e.to_string())
    }
}

/// Errors that occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    BackendError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_remedy_mentions_reload() {
        let err = QuireError::Conflict {
            path: "books.json".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.remedy().contains("reload"));
        assert!(err.to_string().contains("books.json"));
    }

    #[test]
    fn test_transport_is_distinct_from_conflict() {
        let err = QuireError::Transport("connection refused".to_string());
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.remedy().contains("network"));
    }
}
