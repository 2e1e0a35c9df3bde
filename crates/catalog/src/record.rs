use crate::codec::MediaType;

/// One media file in the catalog.
///
/// Records are rebuilt from the remote listing on every refresh and never
/// persisted. `path` is the unique key; the remote store guarantees that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRecord {
    /// Filename as stored, including the `{epoch}_` prefix.
    pub name: String,
    /// Filename as originally uploaded.
    pub display_name: String,
    pub path: String,
    pub download_url: String,
    pub html_url: String,
    pub media_type: MediaType,
    /// Size in bytes; `0` when the listing didn't report it.
    pub size: u64,
    /// Upload time in epoch milliseconds, taken from the filename prefix.
    pub created_at: i64,
}

impl MediaRecord {
    /// Whether the listing that produced this record reported a size.
    pub fn size_known(&self) -> bool {
        self.size > 0
    }
}
