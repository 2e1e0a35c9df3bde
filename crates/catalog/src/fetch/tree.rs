use crate::codec::{MediaType, decode_path};
use crate::record::MediaRecord;
use crate::session::Session;
use gallery_remote::error::Result as RemoteResult;
use gallery_remote::{EntryKind, StoreHandle, TreeEntry};

/// Primary strategy: one recursive listing of the whole branch.
///
/// The tree API reports no sizes, so every record has size `0`. Locators are
/// built by the store from the path.
pub(crate) async fn scan(store: &StoreHandle, session: &Session) -> RemoteResult<Vec<MediaRecord>> {
    let entries = store.get_tree(session.repository(), session.branch(), true, session.token()).await?;
    tracing::debug!(entries = entries.len(), "Tree listing received");
    Ok(entries.into_iter().filter(is_media).filter_map(|entry| to_record(store, session, entry)).collect())
}

fn is_media(entry: &TreeEntry) -> bool {
    entry.kind == EntryKind::File
        && MediaType::ALL.iter().any(|media_type| {
            entry.path.strip_prefix(media_type.folder()).is_some_and(|rest| rest.starts_with('/'))
        })
}

fn to_record(store: &StoreHandle, session: &Session, entry: TreeEntry) -> Option<MediaRecord> {
    let decoded = match decode_path(&entry.path) {
        Ok(decoded) => decoded,
        Err(err) => {
            tracing::warn!(path = %entry.path, error = %*err, "Skipping media file with malformed path");
            return None;
        },
    };
    Some(MediaRecord {
        name: decoded.file_name,
        display_name: decoded.display_name,
        download_url: store.raw_url(session.repository(), session.branch(), &entry.path),
        html_url: store.blob_url(session.repository(), session.branch(), &entry.path),
        path: entry.path,
        media_type: decoded.media_type,
        size: 0,
        created_at: decoded.created_at,
    })
}
