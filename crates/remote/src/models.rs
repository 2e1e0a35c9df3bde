//! Remote store models.
//!
//! These are the shapes the store hands back, already normalised away from
//! whatever the hosting API's JSON looks like.

use std::fmt;

/// Access token for the hosting API.
///
/// Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);
impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}
impl From<String> for Token {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Owner and name of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}
impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}
impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The account a token belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub login: String,
    /// Profile name, or the login when the account has none set.
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Repository metadata returned after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub owner: String,
    pub name: String,
    pub default_branch: String,
    pub html_url: String,
}

/// What a listed path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks, submodules and anything else the remote might report.
    Other,
}
impl EntryKind {
    /// Map the kind strings used by both the git tree API (`blob`, `tree`)
    /// and the contents API (`file`, `dir`).
    pub fn from_remote(kind: &str) -> Self {
        match kind {
            "blob" | "file" => Self::File,
            "tree" | "dir" => Self::Directory,
            _ => Self::Other,
        }
    }
}

/// One entry from a recursive tree listing. The tree API reports no size or
/// URLs, only where things are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub kind: EntryKind,
}

/// One entry from a single-folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub name: String,
    pub path: String,
    /// Missing for directories.
    pub download_url: Option<String>,
    pub html_url: Option<String>,
    pub size: u64,
    pub kind: EntryKind,
}

/// Acknowledgement of a completed content write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutReceipt {
    pub path: String,
}
