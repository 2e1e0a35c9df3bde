use crate::codec::{MediaType, split_file_name};
use crate::record::MediaRecord;
use crate::session::Session;
use gallery_remote::error::Error as RemoteError;
use gallery_remote::{EntryKind, FolderEntry, StoreHandle};

/// What the per-folder fallback managed to list.
pub(crate) struct Listing {
    pub records: Vec<MediaRecord>,
    /// Folders whose listing failed, with why.
    pub failed: Vec<(MediaType, RemoteError)>,
}

/// Fallback strategy: list each media folder on its own.
///
/// Folders are requested one at a time, in [`MediaType::ALL`] order. A folder
/// that fails is recorded and skipped; the others still count.
pub(crate) async fn list(store: &StoreHandle, session: &Session) -> Listing {
    let mut listing = Listing {
        records: Vec::new(),
        failed: Vec::new(),
    };
    for media_type in MediaType::ALL {
        match store.list_folder(session.repository(), media_type.folder(), session.token()).await {
            Ok(entries) => {
                let before = listing.records.len();
                listing.records.extend(
                    entries
                        .into_iter()
                        .filter(|entry| entry.kind == EntryKind::File)
                        .filter_map(|entry| to_record(store, session, media_type, entry)),
                );
                tracing::debug!(folder = media_type.folder(), records = listing.records.len() - before, "Folder listed");
            },
            Err(err) => {
                tracing::warn!(folder = media_type.folder(), error = %*err, "Folder listing failed; skipping");
                listing.failed.push((media_type, err));
            },
        }
    }
    listing
}

fn to_record(store: &StoreHandle, session: &Session, media_type: MediaType, entry: FolderEntry) -> Option<MediaRecord> {
    let Some((created_at, display_name)) = split_file_name(&entry.name) else {
        tracing::warn!(path = %entry.path, "Skipping media file without a timestamp prefix");
        return None;
    };
    let display_name = display_name.to_string();
    let download_url =
        entry.download_url.unwrap_or_else(|| store.raw_url(session.repository(), session.branch(), &entry.path));
    let html_url = entry.html_url.unwrap_or_else(|| store.blob_url(session.repository(), session.branch(), &entry.path));
    Some(MediaRecord {
        name: entry.name,
        display_name,
        path: entry.path,
        download_url,
        html_url,
        media_type,
        size: entry.size,
        created_at,
    })
}
