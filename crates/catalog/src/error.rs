//! Catalog Error Types
//!
//! Errors raised by the path codec and shared media types. Each pipeline
//! ([`upload`](crate::upload), [`fetch`](crate::fetch),
//! [`session`](crate::session)) has its own error module on top of these.

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Path does not follow `{folder}/{epoch-millis}_{name}`.
    #[display("malformed media path: {_0}")]
    MalformedPath(#[error(not(source))] String),
    /// Not one of `image`, `video` or `audio`.
    #[display("unknown media type: {_0}")]
    UnknownMediaType(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
