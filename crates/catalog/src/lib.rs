//! Media catalog synchronization.
//!
//! Treats a single hosting repository as an object store for images, videos
//! and audio. Files are written under a fixed layout (see [`codec`]) and the
//! catalog is rebuilt from a remote listing on every refresh; nothing is
//! cached locally.
//!
//! - [`upload`] streams a batch of local files into the repository.
//! - [`fetch_catalog`] lists the repository (tree scan first, per-folder
//!   listing as fallback) into a sorted [`Catalog`].
//! - [`CatalogView`] holds the last catalog and filters it by type.
//! - [`login`] produces the [`Session`] everything else runs under.

mod clock;
pub mod codec;
pub mod error;
pub mod fetch;
pub mod format;
mod record;
pub mod session;
pub mod upload;
mod view;

pub use crate::clock::{Clock, SystemClock};
pub use crate::codec::MediaType;
pub use crate::fetch::{Catalog, CatalogSource, fetch_catalog};
pub use crate::record::MediaRecord;
pub use crate::session::{Credentials, RepoSettings, Session, login};
pub use crate::upload::{LocalFile, UploadEvent, UploadRequest, upload, upload_all};
pub use crate::view::{CatalogView, Filter, ViewState};

/// Largest file the hosting contents API accepts in one write.
pub const MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;
