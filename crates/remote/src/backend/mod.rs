//! Remote store trait and implementations.
//!
//! This module defines the `RemoteStore` trait, the narrow set of hosting API
//! calls the gallery needs: who am I, does my repository exist, list what is
//! in it (two different ways) and write a file into it.
//!

#[cfg(feature = "github")]
mod github;
#[cfg(feature = "mock")]
mod mock;
mod ro;

#[cfg(feature = "github")]
pub use self::github::{Endpoints, GithubStore};
#[cfg(feature = "mock")]
pub use self::mock::{Call, Fault, MockStore};
pub use self::ro::ReadOnlyStore;
use crate::error::Result;
use crate::models::{FolderEntry, Identity, PutReceipt, RepoInfo, RepoRef, Token, TreeEntry};
use async_trait::async_trait;

/// Unified interface for remote repository stores.
///
/// Every call is authenticated with the [`Token`] passed in; implementations
/// hold no credentials of their own. No method retries: a failed request is
/// reported once and the caller decides what to do.
///
/// # Path Handling
/// All paths are relative to the repository root and `/`-separated.
/// Implementations validate them with [`validate_path`](crate::validate_path)
/// before use.
///
/// # Examples
///
/// ```
/// use gallery_remote::{RemoteStore, RepoRef, Token, EntryKind, error::Result};
///
/// async fn count_files(store: &dyn RemoteStore, repo: &RepoRef, token: &Token) -> Result<usize> {
///     let tree = store.get_tree(repo, "main", true, token).await?;
///     Ok(tree.iter().filter(|entry| entry.kind == EntryKind::File).count())
/// }
/// ```
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Name of the configured store (used for logging only).
    fn name(&self) -> &str;

    /// Resolve the account that owns `token`.
    ///
    /// Returns [`InvalidCredential`](crate::error::ErrorKind::InvalidCredential)
    /// if the remote rejects the token.
    async fn get_identity(&self, token: &Token) -> Result<Identity>;

    /// Check whether a repository is visible to `token`.
    ///
    /// Any non-success response counts as "does not exist"; only a failure to
    /// get a response at all is an error.
    async fn repository_exists(&self, repo: &RepoRef, token: &Token) -> Result<bool>;

    /// Create a public, auto-initialised repository owned by the token's account.
    ///
    /// Returns [`RemoteWrite`](crate::error::ErrorKind::RemoteWrite) carrying
    /// the remote's message on failure.
    async fn create_repository(&self, name: &str, description: &str, token: &Token) -> Result<RepoInfo>;

    /// List the tree of `branch` in a single request.
    ///
    /// Returns [`RemoteRead`](crate::error::ErrorKind::RemoteRead) on any failure.
    async fn get_tree(&self, repo: &RepoRef, branch: &str, recursive: bool, token: &Token) -> Result<Vec<TreeEntry>>;

    /// List the direct children of one folder.
    ///
    /// A folder that doesn't exist lists as empty. Returns
    /// [`RemoteRead`](crate::error::ErrorKind::RemoteRead) on any other
    /// failure.
    async fn list_folder(&self, repo: &RepoRef, path: &str, token: &Token) -> Result<Vec<FolderEntry>>;

    /// Create or update a file with already base64-encoded content.
    ///
    /// Returns [`RemoteWrite`](crate::error::ErrorKind::RemoteWrite) carrying
    /// the remote's message on failure.
    async fn put_file(
        &self,
        repo: &RepoRef,
        path: &str,
        content_base64: &str,
        message: &str,
        token: &Token,
    ) -> Result<PutReceipt>;

    /// Locator for the raw bytes of `path` on `branch`.
    fn raw_url(&self, repo: &RepoRef, branch: &str, path: &str) -> String;

    /// Locator for the human-facing page of `path` on `branch`.
    fn blob_url(&self, repo: &RepoRef, branch: &str, path: &str) -> String;
}
