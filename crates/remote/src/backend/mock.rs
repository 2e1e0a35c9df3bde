//! In-memory remote store for testing.

use crate::error::{ErrorKind, Result};
use crate::models::{EntryKind, FolderEntry, Identity, PutReceipt, RepoInfo, RepoRef, Token, TreeEntry};
use crate::path::validate as validate_path;
use crate::RemoteStore;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;
use tokio::sync::RwLock;

/// Failure to inject into a [`MockStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// `get_identity` rejects every token.
    Identity,
    /// `get_tree` fails as if the request never got a response.
    Tree,
    /// `list_folder` fails for this folder.
    Folder(String),
    /// `create_repository` fails.
    CreateRepository,
    /// The n-th `put_file` call (1-based, counted across the store's
    /// lifetime) fails.
    PutCall(usize),
}

/// A call observed by a [`MockStore`], recorded before any fault applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetIdentity,
    RepositoryExists { repository: String },
    CreateRepository { repository: String },
    GetTree { repository: String },
    ListFolder { repository: String, path: String },
    PutFile { repository: String, path: String, message: String },
}

#[derive(Debug, Clone)]
enum Content {
    Raw(Vec<u8>),
    Encoded(String),
}
impl Content {
    fn size(&self) -> u64 {
        match self {
            Self::Raw(bytes) => bytes.len() as u64,
            Self::Encoded(text) => {
                let padding = text.bytes().rev().take_while(|b| *b == b'=').count();
                ((text.len() / 4 * 3).saturating_sub(padding)) as u64
            },
        }
    }
}

type Repository = BTreeMap<String, Content>;

/// In-memory remote store for testing.
///
/// Repositories are held in a `HashMap` behind a [`RwLock`], so all trait
/// methods can operate on `&self`. Every call is journalled (see
/// [`calls()`](Self::calls)) and failures can be injected per operation with
/// [`with_fault()`](Self::with_fault).
///
/// # Examples
///
/// ```
/// use gallery_remote::backend::{Fault, MockStore};
/// use gallery_remote::{RemoteStore, RepoRef, Token};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MockStore::new("octocat")
///     .with_files("gallery", [("images/1700000000000_cat.png", b"png")])
///     .with_fault(Fault::Tree);
/// let repo = RepoRef::new("octocat", "gallery");
/// let token = Token::new("ghp_example");
///
/// assert!(store.get_tree(&repo, "main", true, &token).await.is_err());
/// assert_eq!(store.list_folder(&repo, "images", &token).await?.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct MockStore {
    name: String,
    identity: Identity,
    token: Option<Token>,
    repositories: RwLock<HashMap<String, Repository>>,
    faults: Vec<Fault>,
    calls: Mutex<Vec<Call>>,
}

impl MockStore {
    /// Create an empty mock account owned by `login`.
    pub fn new(login: impl Into<String>) -> Self {
        let login = login.into();
        Self {
            name: "mock".to_string(),
            identity: Identity {
                display_name: login.clone(),
                login,
                avatar_url: None,
            },
            token: None,
            repositories: RwLock::new(HashMap::new()),
            faults: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Only accept this token in `get_identity`.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Token::new(token));
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.identity.display_name = display_name.into();
        self
    }

    /// Add an empty repository.
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repositories.get_mut().entry(repository.into()).or_default();
        self
    }

    /// Add files to a repository, creating it if needed.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_files(
        mut self,
        repository: impl Into<String>,
        files: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>,
    ) -> Self {
        let repo = self.repositories.get_mut().entry(repository.into()).or_default();
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                // The panic here is DELIBERATE. MockStore is intended to be
                // used in tests; panics are expected. There is no error result.
                panic!("MockStore::with_files: invalid path {path}");
            };
            repo.insert(validated, Content::Raw(data.into()));
        }
        self
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    /// Change the name of the mock store.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Every call observed so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Paths of every file in `repository`, sorted.
    pub async fn files(&self, repository: &str) -> Vec<String> {
        self.repositories.read().await.get(repository).map(|repo| repo.keys().cloned().collect()).unwrap_or_default()
    }

    /// The base64 content written by `put_file`, if that is how the file got there.
    pub async fn encoded(&self, repository: &str, path: &str) -> Option<String> {
        match self.repositories.read().await.get(repository)?.get(path)? {
            Content::Encoded(text) => Some(text.clone()),
            Content::Raw(_) => None,
        }
    }

    fn record(&self, call: Call) -> usize {
        let Ok(mut calls) = self.calls.lock() else {
            panic!("MockStore: call journal poisoned");
        };
        calls.push(call);
        calls.iter().filter(|c| matches!(c, Call::PutFile { .. })).count()
    }

    fn has_fault(&self, fault: &Fault) -> bool {
        self.faults.contains(fault)
    }
}

#[async_trait]
impl RemoteStore for MockStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_identity(&self, token: &Token) -> Result<Identity> {
        self.record(Call::GetIdentity);
        let rejected = self.token.as_ref().is_some_and(|expected| expected != token);
        if rejected || self.has_fault(&Fault::Identity) {
            exn::bail!(ErrorKind::InvalidCredential);
        }
        Ok(self.identity.clone())
    }

    async fn repository_exists(&self, repo: &RepoRef, _token: &Token) -> Result<bool> {
        self.record(Call::RepositoryExists { repository: repo.name.clone() });
        Ok(self.repositories.read().await.contains_key(&repo.name))
    }

    async fn create_repository(&self, name: &str, _description: &str, _token: &Token) -> Result<RepoInfo> {
        self.record(Call::CreateRepository { repository: name.to_string() });
        if self.has_fault(&Fault::CreateRepository) {
            exn::bail!(ErrorKind::RemoteWrite("mock failure".to_string()));
        }
        let mut guard = self.repositories.write().await;
        if guard.contains_key(name) {
            exn::bail!(ErrorKind::RemoteWrite("name already exists on this account".to_string()));
        }
        guard.insert(name.to_string(), Repository::new());
        Ok(RepoInfo {
            owner: self.identity.login.clone(),
            name: name.to_string(),
            default_branch: "main".to_string(),
            html_url: format!("mock://blob/{}/{name}", self.identity.login),
        })
    }

    async fn get_tree(&self, repo: &RepoRef, _branch: &str, _recursive: bool, _token: &Token) -> Result<Vec<TreeEntry>> {
        self.record(Call::GetTree { repository: repo.name.clone() });
        if self.has_fault(&Fault::Tree) {
            exn::bail!(ErrorKind::RemoteRead("mock failure".to_string()));
        }
        let guard = self.repositories.read().await;
        let Some(files) = guard.get(&repo.name) else {
            exn::bail!(ErrorKind::RemoteRead("Not Found".to_string()));
        };
        let directories: BTreeSet<&str> =
            files.keys().flat_map(|path| path.match_indices('/').map(move |(idx, _)| &path[..idx])).collect();
        let mut entries: Vec<TreeEntry> =
            directories.into_iter().map(|path| TreeEntry { path: path.to_string(), kind: EntryKind::Directory }).collect();
        entries.extend(files.keys().map(|path| TreeEntry { path: path.clone(), kind: EntryKind::File }));
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn list_folder(&self, repo: &RepoRef, path: &str, _token: &Token) -> Result<Vec<FolderEntry>> {
        self.record(Call::ListFolder {
            repository: repo.name.clone(),
            path: path.to_string(),
        });
        if self.has_fault(&Fault::Folder(path.to_string())) {
            exn::bail!(ErrorKind::RemoteRead("mock failure".to_string()));
        }
        let folder = validate_path(path)?;
        let guard = self.repositories.read().await;
        let Some(files) = guard.get(&repo.name) else {
            exn::bail!(ErrorKind::RemoteRead("Not Found".to_string()));
        };
        let prefix = format!("{folder}/");
        let mut entries = Vec::new();
        let mut seen_directories = BTreeSet::new();
        for (file_path, content) in files.range(prefix.clone()..) {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                break;
            };
            match rest.split_once('/') {
                None => entries.push(FolderEntry {
                    name: rest.to_string(),
                    path: file_path.clone(),
                    download_url: Some(self.raw_url(repo, "main", file_path)),
                    html_url: Some(self.blob_url(repo, "main", file_path)),
                    size: content.size(),
                    kind: EntryKind::File,
                }),
                Some((directory, _)) => {
                    if seen_directories.insert(directory.to_string()) {
                        let dir_path = format!("{prefix}{directory}");
                        entries.push(FolderEntry {
                            name: directory.to_string(),
                            html_url: Some(self.blob_url(repo, "main", &dir_path)),
                            path: dir_path,
                            download_url: None,
                            size: 0,
                            kind: EntryKind::Directory,
                        });
                    }
                },
            }
        }
        Ok(entries)
    }

    async fn put_file(
        &self,
        repo: &RepoRef,
        path: &str,
        content_base64: &str,
        message: &str,
        _token: &Token,
    ) -> Result<PutReceipt> {
        let nth = self.record(Call::PutFile {
            repository: repo.name.clone(),
            path: path.to_string(),
            message: message.to_string(),
        });
        if self.has_fault(&Fault::PutCall(nth)) {
            exn::bail!(ErrorKind::RemoteWrite("mock failure".to_string()));
        }
        let path = validate_path(path)?;
        let mut guard = self.repositories.write().await;
        let Some(files) = guard.get_mut(&repo.name) else {
            exn::bail!(ErrorKind::RemoteWrite("Not Found".to_string()));
        };
        files.insert(path.clone(), Content::Encoded(content_base64.to_string()));
        Ok(PutReceipt { path })
    }

    fn raw_url(&self, repo: &RepoRef, branch: &str, path: &str) -> String {
        format!("mock://raw/{}/{}/{branch}/{path}", repo.owner, repo.name)
    }

    fn blob_url(&self, repo: &RepoRef, branch: &str, path: &str) -> String {
        format!("mock://blob/{}/{}/{branch}/{path}", repo.owner, repo.name)
    }
}
