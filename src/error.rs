//! Error taxonomy for glitch.
//!
//! A single [`Error`] enum classifies every failure the core can produce.
//! The retry wrapper pattern-matches on [`Error::is_retryable`] instead of
//! relying on error source chains: rate limits and upstream server errors
//! are transient, everything else is fatal for the current exchange.

use std::path::PathBuf;

/// Every failure mode surfaced by the conversation core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The completion API rejected the request with a rate limit (HTTP 429).
    #[error("rate limited by the completion API")]
    RateLimited,

    /// The completion API answered with an upstream server error (5xx).
    #[error("completion API server error (status {status})")]
    ServerStatus { status: u16 },

    /// A non-transient completion failure (transport, malformed response,
    /// authentication, ...). Aborts the current exchange.
    #[error("completion failed: {message}")]
    Completion { message: String },

    /// The retry wrapper gave up after exhausting its attempt cap.
    #[error("completion failed after {attempts} attempts: retries exhausted")]
    RetriesExhausted { attempts: usize },

    /// A tool call carried missing or malformed arguments.
    #[error("invalid tool arguments: {message}")]
    Argument { message: String },

    /// The model asked for a capability that is not registered.
    #[error("unknown capability: {name}")]
    UnresolvedCapability { name: String },

    /// A user-supplied path does not exist.
    #[error("file does not exist: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// A user-supplied file has an extension the extractor cannot process.
    #[error("cannot process this file type: {}", .path.display())]
    UnsupportedFileType { path: PathBuf },

    /// Filesystem plumbing (transcripts, saved documents).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the retry wrapper should re-attempt after this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RateLimited | Error::ServerStatus { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_kinds_are_retryable() {
        assert!(Error::RateLimited.is_retryable());
        assert!(Error::ServerStatus { status: 503 }.is_retryable());
    }

    #[test]
    fn fatal_kinds_are_not_retryable() {
        assert!(!Error::Completion { message: "bad key".into() }.is_retryable());
        assert!(!Error::RetriesExhausted { attempts: 5 }.is_retryable());
        assert!(!Error::UnresolvedCapability { name: "x".into() }.is_retryable());
        assert!(!Error::Argument { message: "missing code".into() }.is_retryable());
    }
}
