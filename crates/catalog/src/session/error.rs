//! Error types for the [`session`](super) module.

use derive_more::{Display, Error};

/// A login error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for login operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The token was rejected or belongs to a different account.
    #[display("invalid credential")]
    InvalidCredential,
    /// The token works, but for someone else.
    #[display("token belongs to {actual}, not {expected}")]
    UsernameMismatch { expected: String, actual: String },
    /// Checking for or creating the gallery repository failed.
    #[display("could not prepare repository {_0}")]
    Repository(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Repository(_))
    }
}
