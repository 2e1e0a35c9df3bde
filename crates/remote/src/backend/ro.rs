//! Read-only remote store.
//!
//! This module provides a store implementation that wraps other
//! implementations and prevents write operations from executing, but
//! indicating success on return.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FolderEntry, Identity, PutReceipt, RepoInfo, RepoRef, Token, TreeEntry};
use crate::{RemoteStore, StoreHandle, validate_path};

/// Read-only remote store.
///
/// Wraps another store and silently drops all write operations, logging an
/// [`info event`](tracing::Event). Used for dry runs.
#[derive(Clone)]
pub struct ReadOnlyStore {
    inner: StoreHandle,
}
impl ReadOnlyStore {
    pub fn new(inner: StoreHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl RemoteStore for ReadOnlyStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn get_identity(&self, token: &Token) -> Result<Identity> {
        self.inner.get_identity(token).await
    }

    async fn repository_exists(&self, repo: &RepoRef, token: &Token) -> Result<bool> {
        self.inner.repository_exists(repo, token).await
    }

    async fn create_repository(&self, name: &str, description: &str, _token: &Token) -> Result<RepoInfo> {
        tracing::info!(repository = name, description, "Skipping repository creation during read-only mode");
        Ok(RepoInfo {
            owner: String::new(),
            name: name.to_string(),
            default_branch: "main".to_string(),
            html_url: String::new(),
        })
    }

    async fn get_tree(&self, repo: &RepoRef, branch: &str, recursive: bool, token: &Token) -> Result<Vec<TreeEntry>> {
        self.inner.get_tree(repo, branch, recursive, token).await
    }

    async fn list_folder(&self, repo: &RepoRef, path: &str, token: &Token) -> Result<Vec<FolderEntry>> {
        self.inner.list_folder(repo, path, token).await
    }

    async fn put_file(
        &self,
        repo: &RepoRef,
        path: &str,
        content_base64: &str,
        _message: &str,
        _token: &Token,
    ) -> Result<PutReceipt> {
        let path = validate_path(path)?;
        tracing::info!(%repo, %path, encoded_bytes = content_base64.len(), "Skipping write during read-only mode");
        Ok(PutReceipt { path })
    }

    fn raw_url(&self, repo: &RepoRef, branch: &str, path: &str) -> String {
        self.inner.raw_url(repo, branch, path)
    }

    fn blob_url(&self, repo: &RepoRef, branch: &str, path: &str) -> String {
        self.inner.blob_url(repo, branch, path)
    }
}
