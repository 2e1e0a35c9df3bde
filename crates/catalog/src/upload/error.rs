//! Error types for the [`upload`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};

/// An upload error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for upload operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies an upload failure.
///
/// ### Rejected before any transfer
/// - [`ErrorKind::FileTooLarge`]
/// - [`ErrorKind::InvalidFileName`]
///
/// ### Batch stopped part-way
/// - [`ErrorKind::UploadAborted`], with [`ErrorKind::LocalRead`] or
///   [`ErrorKind::Storage`] underneath.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A file in the batch exceeds the size limit. Nothing was written.
    #[display("{name} is {size} bytes; the limit is {limit}")]
    FileTooLarge { name: String, size: u64, limit: u64 },
    /// A filename that can't be stored as a single path segment.
    #[display("invalid file name: {_0:?}")]
    InvalidFileName(#[error(not(source))] String),
    /// The batch stopped at this file (1-based). Earlier files were written.
    #[display("upload stopped at file {index} ({filename})")]
    UploadAborted { index: usize, filename: String },
    /// Reading the local file failed.
    #[display("could not read {_0}")]
    LocalRead(#[error(not(source))] String),
    /// The remote store rejected the write.
    Storage,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UploadAborted { .. } | Self::Storage)
    }
}
