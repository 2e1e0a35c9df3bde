//! Login and the session context.
//!
//! A [`Session`] is created by [`login`] and owns everything the pipelines
//! need to talk to the remote: who the user is, which repository holds the
//! gallery and the token to use. Dropping it is logging out.

pub mod error;

use self::error::{ErrorKind, Result};
use exn::ResultExt;
use gallery_remote::{Identity, RepoRef, StoreHandle, Token};
use tracing::instrument;

/// Repository used when nothing else is configured.
pub const DEFAULT_REPOSITORY: &str = "github-media-gallery";
pub const DEFAULT_DESCRIPTION: &str = "Repository for storing media from GitHub Media Gallery";
pub const DEFAULT_BRANCH: &str = "main";

/// What the user typed in: an account name and an access token.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub token: Token,
}
impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: Token::new(token),
        }
    }
}

/// Where the gallery lives inside the user's account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSettings {
    pub name: String,
    /// Only used when the repository has to be created.
    pub description: String,
    pub branch: String,
}
impl Default for RepoSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_REPOSITORY.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
        }
    }
}

/// An authenticated user bound to their gallery repository.
#[derive(Debug, Clone)]
pub struct Session {
    identity: Identity,
    repository: RepoRef,
    branch: String,
    token: Token,
}

impl Session {
    /// Assemble a session from already-verified parts. [`login`] is the
    /// usual way to get one.
    pub fn new(identity: Identity, repository: RepoRef, branch: impl Into<String>, token: Token) -> Self {
        Self {
            identity,
            repository,
            branch: branch.into(),
            token,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn repository(&self) -> &RepoRef {
        &self.repository
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn token(&self) -> &Token {
        &self.token
    }
}

/// Verify credentials and make sure the gallery repository exists.
///
/// 1. The token must resolve to an identity.
/// 2. That identity's login must match `username` (case-insensitively).
/// 3. The repository is created (public, auto-initialised) if missing.
#[instrument(skip_all, fields(store = store.name(), username = %credentials.username, repository = %settings.name))]
pub async fn login(store: &StoreHandle, credentials: Credentials, settings: &RepoSettings) -> Result<Session> {
    let identity = store.get_identity(&credentials.token).await.or_raise(|| ErrorKind::InvalidCredential)?;
    if !identity.login.eq_ignore_ascii_case(credentials.username.trim()) {
        let mismatch = ErrorKind::UsernameMismatch {
            expected: credentials.username,
            actual: identity.login,
        };
        return Err(exn::Exn::from(mismatch).raise(ErrorKind::InvalidCredential));
    }

    let repository = RepoRef::new(identity.login.clone(), settings.name.clone());
    let exists = store
        .repository_exists(&repository, &credentials.token)
        .await
        .or_raise(|| ErrorKind::Repository(repository.to_string()))?;
    if !exists {
        tracing::info!(%repository, "Gallery repository not found; creating it");
        store
            .create_repository(&settings.name, &settings.description, &credentials.token)
            .await
            .or_raise(|| ErrorKind::Repository(repository.to_string()))?;
    }

    tracing::info!(login = %identity.login, %repository, "Logged in");
    Ok(Session::new(identity, repository, settings.branch.clone(), credentials.token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_remote::backend::{Call, Fault, MockStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_login_existing_repository() {
        let mock = Arc::new(
            MockStore::new("octocat")
                .with_token("ghp_ok")
                .with_display_name("The Octocat")
                .with_repository(DEFAULT_REPOSITORY),
        );
        let store: StoreHandle = mock.clone();
        let session = login(&store, Credentials::new("OctoCat", "ghp_ok"), &RepoSettings::default()).await.unwrap();
        assert_eq!(session.identity().display_name, "The Octocat");
        assert_eq!(session.repository(), &RepoRef::new("octocat", DEFAULT_REPOSITORY));
        assert_eq!(session.branch(), "main");
        assert!(!mock.calls().iter().any(|call| matches!(call, Call::CreateRepository { .. })));
    }

    #[tokio::test]
    async fn test_login_creates_missing_repository() {
        let mock = Arc::new(MockStore::new("octocat"));
        let store: StoreHandle = mock.clone();
        login(&store, Credentials::new("octocat", "t"), &RepoSettings::default()).await.unwrap();
        assert_eq!(
            mock.calls(),
            vec![
                Call::GetIdentity,
                Call::RepositoryExists { repository: DEFAULT_REPOSITORY.to_string() },
                Call::CreateRepository { repository: DEFAULT_REPOSITORY.to_string() },
            ]
        );
    }

    #[tokio::test]
    async fn test_login_rejected_token() {
        let store: StoreHandle = Arc::new(MockStore::new("octocat").with_token("right"));
        let err = login(&store, Credentials::new("octocat", "wrong"), &RepoSettings::default()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidCredential));
    }

    #[tokio::test]
    async fn test_login_username_mismatch() {
        let mock = Arc::new(MockStore::new("octocat"));
        let store: StoreHandle = mock.clone();
        let err = login(&store, Credentials::new("hubot", "t"), &RepoSettings::default()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidCredential));
        // Nothing past the identity check happens.
        assert_eq!(mock.calls(), vec![Call::GetIdentity]);
    }

    #[tokio::test]
    async fn test_login_repository_creation_fails() {
        let store: StoreHandle = Arc::new(MockStore::new("octocat").with_fault(Fault::CreateRepository));
        let err = login(&store, Credentials::new("octocat", "t"), &RepoSettings::default()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Repository(_)));
    }
}
