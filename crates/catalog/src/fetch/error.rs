//! Error types for the [`fetch`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};

/// A catalog retrieval error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog retrieval.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Neither the tree scan nor any folder listing produced a result. Check
    /// the credentials and that the repository exists; an empty catalog is
    /// reported as an empty [`Catalog`](super::Catalog) instead.
    #[display("media catalog unavailable")]
    CatalogUnavailable,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CatalogUnavailable)
    }
}
