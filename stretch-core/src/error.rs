//! Error types for stretch-core.

use thiserror::Error;

/// Result type alias using stretch-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an operation.
///
/// Per-item verification failures are not errors: they surface as a
/// failed [`VerificationResult`](crate::types::VerificationResult) so that
/// batches keep going.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing credentials, invalid pattern, bad value)
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed input dataset
    #[error("Invalid dataset: {0}")]
    Dataset(String),

    /// Operation cancelled at a suspension point
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an I/O error tagged with the path it happened on.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Create a dataset error.
    pub fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset(message.into())
    }

    /// Whether this error came from a cancellation request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Outcome of a single failed attempt against the verification endpoint.
///
/// The split between the two variants drives the retry policy: rate limiting
/// backs off, transport failures retry straight away.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// The endpoint answered 429
    #[error("rate limited by verification endpoint")]
    RateLimited,

    /// Network failure, non-2xx status, or an unreadable body
    #[error("{0}")]
    Transport(String),
}

impl AttemptError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_carries_path() {
        let err = Error::io(
            "/tmp/missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.json"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_attempt_error_display() {
        assert_eq!(
            AttemptError::transport("HTTP 500: boom").to_string(),
            "HTTP 500: boom"
        );
        assert!(AttemptError::RateLimited.to_string().contains("rate limited"));
    }

    #[test]
    fn test_cancelled_flag() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::config("x").is_cancelled());
    }
}
