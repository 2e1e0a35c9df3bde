//! Catalog retrieval.
//!
//! [`fetch_catalog`] rebuilds the full media list from the remote on every
//! call. The primary strategy is a single recursive tree listing; if that
//! fails, each media folder is listed on its own and whatever succeeds is
//! returned. Only when both strategies produce nothing at all does the fetch
//! fail.
//!
//! Records are always sorted newest first by the timestamp encoded in their
//! path. The sort is stable, so records sharing a timestamp keep listing
//! order.

pub mod error;
mod folder;
mod tree;

use self::error::{ErrorKind, Result};
use crate::codec::MediaType;
use crate::record::MediaRecord;
use crate::session::Session;
use gallery_remote::StoreHandle;
use tracing::instrument;

/// How a [`Catalog`] was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Recursive tree listing. Sizes are not known.
    Tree,
    /// Per-folder listing; every folder answered.
    Fallback,
    /// Per-folder listing; these folders failed and their media is missing.
    PartialFallback { failed: Vec<MediaType> },
}

/// Every media file found in the gallery, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub records: Vec<MediaRecord>,
    pub source: CatalogSource,
}

impl Catalog {
    /// Whether some media may be missing because a folder could not be listed.
    pub fn is_partial(&self) -> bool {
        matches!(self.source, CatalogSource::PartialFallback { .. })
    }

    /// Number of records of each type, in [`MediaType::ALL`] order.
    pub fn counts(&self) -> [(MediaType, usize); 3] {
        MediaType::ALL
            .map(|media_type| (media_type, self.records.iter().filter(|r| r.media_type == media_type).count()))
    }
}

/// List every media file in the session's gallery repository.
///
/// A tree listing that succeeds but contains no media yields an empty catalog
/// without trying the fallback. Entries whose path doesn't follow the storage
/// convention are skipped with a warning.
///
/// # Errors
///
/// [`CatalogUnavailable`](ErrorKind::CatalogUnavailable) if the tree listing
/// fails and so does every folder listing. The tree error is attached as the
/// cause; folder errors are logged.
#[instrument(skip_all, fields(store = store.name(), repository = %session.repository(), branch = session.branch()))]
pub async fn fetch_catalog(store: &StoreHandle, session: &Session) -> Result<Catalog> {
    let tree_err = match tree::scan(store, session).await {
        Ok(records) => {
            tracing::info!(records = records.len(), "Catalog fetched from tree listing");
            return Ok(Catalog {
                records: sorted(records),
                source: CatalogSource::Tree,
            });
        },
        Err(err) => err,
    };
    tracing::warn!(error = %*tree_err, "Tree listing failed; falling back to per-folder listing");

    let listing = folder::list(store, session).await;
    if listing.failed.len() == MediaType::ALL.len() {
        tracing::error!("Every folder listing failed");
        return Err(tree_err.raise(ErrorKind::CatalogUnavailable));
    }
    let source = if listing.failed.is_empty() {
        CatalogSource::Fallback
    } else {
        CatalogSource::PartialFallback {
            failed: listing.failed.into_iter().map(|(media_type, _)| media_type).collect(),
        }
    };
    tracing::info!(records = listing.records.len(), ?source, "Catalog fetched from folder listings");
    Ok(Catalog {
        records: sorted(listing.records),
        source,
    })
}

fn sorted(mut records: Vec<MediaRecord>) -> Vec<MediaRecord> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records
}
