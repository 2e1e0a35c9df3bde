pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::RemoteStore;
pub use crate::models::{EntryKind, FolderEntry, Identity, PutReceipt, RepoInfo, RepoRef, Token, TreeEntry};
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type StoreHandle = Arc<dyn RemoteStore + Send + Sync>;
