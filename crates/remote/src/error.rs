//! Remote Store Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A remote store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for remote store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Token was rejected, expired, or lacks the required scopes.
    #[display("invalid credential")]
    InvalidCredential,
    /// A listing or lookup failed; message is what the remote reported.
    #[display("remote read failed: {_0}")]
    RemoteRead(#[error(not(source))] String),
    /// A content write or repository creation failed; message is what the
    /// remote reported.
    #[display("remote write failed: {_0}")]
    RemoteWrite(#[error(not(source))] String),
    /// Repository, branch or path does not exist.
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// Path contains invalid characters or escapes the repository root.
    #[display("invalid path: {_0}")]
    InvalidPath(#[error(not(source))] String),
    /// Configured API location is not a usable base URL.
    #[display("invalid endpoint: {_0}")]
    InvalidEndpoint(#[error(not(source))] String),
    /// Connection, TLS or timeout failure before a response arrived.
    #[display("network error")]
    Network,
    /// Response body did not have the expected shape.
    #[display("unexpected response body")]
    Decode,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::RemoteRead(_))
    }
}
