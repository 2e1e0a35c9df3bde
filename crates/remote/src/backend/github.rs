//! GitHub REST store.
//!
//! Talks to the GitHub v3 REST API (or anything that speaks it, such as a
//! GitHub Enterprise instance) with a personal access token. Two listing
//! APIs are exposed: the git trees API (one request for the whole branch, no
//! sizes) and the contents API (one request per folder, with sizes and URLs).

use crate::error::{ErrorKind, Result};
use crate::models::{EntryKind, FolderEntry, Identity, PutReceipt, RepoInfo, RepoRef, Token, TreeEntry};
use crate::{RemoteStore, validate_path};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

const MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("gallery/", env!("CARGO_PKG_VERSION"));

/// Base locations of the three GitHub surfaces the store touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// REST API root.
    pub api: String,
    /// Raw content host, used to build download locators.
    pub raw: String,
    /// Web UI host, used to build viewing locators.
    pub web: String,
}
impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: "https://api.github.com".to_string(),
            raw: "https://raw.githubusercontent.com".to_string(),
            web: "https://github.com".to_string(),
        }
    }
}

/// GitHub-backed remote store.
///
/// # Examples
///
/// ```no_run
/// use gallery_remote::backend::{Endpoints, GithubStore};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = GithubStore::new("github", Endpoints::default(), Duration::from_secs(30))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GithubStore {
    name: String,
    client: Client,
    api: Url,
    raw: Url,
    web: Url,
}

impl GithubStore {
    /// Create a new GitHub store.
    ///
    /// # Arguments
    /// * `name` - A name for this store (used in logging)
    /// * `endpoints` - API, raw and web hosts
    /// * `timeout` - Per-request timeout; a timed out request fails like any other
    pub fn new(name: impl Into<String>, endpoints: Endpoints, timeout: Duration) -> Result<Self> {
        let api = base_url(&endpoints.api)?;
        let raw = base_url(&endpoints.raw)?;
        let web = base_url(&endpoints.web)?;
        let client = Client::builder().timeout(timeout).user_agent(USER_AGENT).build().or_raise(|| ErrorKind::Network)?;
        Ok(Self {
            name: name.into(),
            client,
            api,
            raw,
            web,
        })
    }

    /// Append percent-encoded path segments to the API root.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        join_segments(&self.api, segments)
    }

    fn contents_url(&self, repo: &RepoRef, path: &str) -> Url {
        self.endpoint(["repos", &repo.owner, &repo.name, "contents"].into_iter().chain(path.split('/')))
    }

    fn request(&self, method: Method, url: Url, token: &Token) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(AUTHORIZATION, format!("token {}", token.expose()))
            .header(ACCEPT, MEDIA_TYPE)
    }

    /// GET and decode, reporting every failure as a read error.
    async fn read<T: DeserializeOwned>(&self, url: Url, token: &Token) -> Result<T> {
        let (response, label) = self.get(url, token).await?;
        decode_read(response, label).await
    }

    /// Like [`read()`](Self::read), but a 404 is `Ok(None)`.
    async fn read_optional<T: DeserializeOwned>(&self, url: Url, token: &Token) -> Result<Option<T>> {
        let (response, label) = self.get(url, token).await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(request = %label, "Remote reported not found");
            return Ok(None);
        }
        decode_read(response, label).await.map(Some)
    }

    async fn get(&self, url: Url, token: &Token) -> Result<(Response, String)> {
        let label = format!("GET {}", url.path());
        let response = self
            .request(Method::GET, url, token)
            .send()
            .await
            .or_raise(|| ErrorKind::Network)
            .or_raise(|| ErrorKind::RemoteRead(label.clone()))?;
        Ok((response, label))
    }

    /// Send a JSON body and decode the reply, reporting every failure as a
    /// write error that carries the remote's own message.
    async fn write<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
        token: &Token,
    ) -> Result<T> {
        let label = format!("{method} {}", url.path());
        let response = self
            .request(method, url, token)
            .json(body)
            .send()
            .await
            .or_raise(|| ErrorKind::Network)
            .or_raise(|| ErrorKind::RemoteWrite(label.clone()))?;
        let status = response.status();
        if !status.is_success() {
            let message = remote_message(response).await;
            tracing::debug!(%status, %message, request = %label, "Remote write rejected");
            exn::bail!(ErrorKind::RemoteWrite(message));
        }
        response.json::<T>().await.or_raise(|| ErrorKind::Decode).or_raise(|| ErrorKind::RemoteWrite(label))
    }
}

async fn decode_read<T: DeserializeOwned>(response: Response, label: String) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = remote_message(response).await;
        tracing::debug!(%status, %message, request = %label, "Remote read rejected");
        let detail = format!("{label}: {status}: {message}");
        return Err(match status {
            StatusCode::NOT_FOUND => exn::Exn::from(ErrorKind::NotFound(label)).raise(ErrorKind::RemoteRead(detail)),
            _ => exn::Exn::from(ErrorKind::RemoteRead(detail)),
        });
    }
    response.json::<T>().await.or_raise(|| ErrorKind::Decode).or_raise(|| ErrorKind::RemoteRead(label))
}

/// The `message` field GitHub puts in error bodies, or the status reason.
async fn remote_message(response: Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(ErrorBody { message: Some(message) }) => message,
        _ => status.canonical_reason().unwrap_or("unknown error").to_string(),
    }
}

#[async_trait]
impl RemoteStore for GithubStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(store = %self.name))]
    async fn get_identity(&self, token: &Token) -> Result<Identity> {
        let user: UserBody = self.read(self.endpoint(["user"]), token).await.or_raise(|| ErrorKind::InvalidCredential)?;
        Ok(user.into())
    }

    #[instrument(skip(self, token), fields(store = %self.name, %repo))]
    async fn repository_exists(&self, repo: &RepoRef, token: &Token) -> Result<bool> {
        let url = self.endpoint(["repos", &repo.owner, &repo.name]);
        let response = self
            .request(Method::GET, url, token)
            .send()
            .await
            .or_raise(|| ErrorKind::Network)
            .or_raise(|| ErrorKind::RemoteRead(format!("repository lookup for {repo}")))?;
        Ok(response.status().is_success())
    }

    #[instrument(skip(self, description, token), fields(store = %self.name))]
    async fn create_repository(&self, name: &str, description: &str, token: &Token) -> Result<RepoInfo> {
        let body = CreateRepoRequest {
            name,
            description,
            auto_init: true,
            private: false,
        };
        let repo: RepoBody = self.write(Method::POST, self.endpoint(["user", "repos"]), &body, token).await?;
        Ok(repo.into())
    }

    #[instrument(skip(self, token), fields(store = %self.name, %repo))]
    async fn get_tree(&self, repo: &RepoRef, branch: &str, recursive: bool, token: &Token) -> Result<Vec<TreeEntry>> {
        let mut url = self.endpoint(["repos", &repo.owner, &repo.name, "git", "trees", branch]);
        if recursive {
            url.query_pairs_mut().append_pair("recursive", "1");
        }
        let tree: TreeBody = self.read(url, token).await?;
        if tree.truncated {
            tracing::warn!(entries = tree.tree.len(), "Tree listing was truncated by the remote; results are incomplete");
        }
        Ok(tree.tree.into_iter().map(TreeEntry::from).collect())
    }

    #[instrument(skip(self, token), fields(store = %self.name, %repo))]
    async fn list_folder(&self, repo: &RepoRef, path: &str, token: &Token) -> Result<Vec<FolderEntry>> {
        let path = validate_path(path)?;
        let entries: Option<Vec<ContentBody>> = self.read_optional(self.contents_url(repo, &path), token).await?;
        let Some(entries) = entries else {
            // Git has no empty directories; a media type nobody uploaded yet has no folder.
            return Ok(Vec::new());
        };
        Ok(entries.into_iter().map(FolderEntry::from).collect())
    }

    #[instrument(skip(self, content_base64, message, token), fields(store = %self.name, %repo, bytes = content_base64.len()))]
    async fn put_file(
        &self,
        repo: &RepoRef,
        path: &str,
        content_base64: &str,
        message: &str,
        token: &Token,
    ) -> Result<PutReceipt> {
        let path = validate_path(path)?;
        let body = PutRequest {
            message,
            content: content_base64,
        };
        let written: PutBody = self.write(Method::PUT, self.contents_url(repo, &path), &body, token).await?;
        Ok(PutReceipt {
            path: written.content.map(|content| content.path).unwrap_or(path),
        })
    }

    fn raw_url(&self, repo: &RepoRef, branch: &str, path: &str) -> String {
        let segments = [repo.owner.as_str(), repo.name.as_str(), branch].into_iter().chain(path.split('/'));
        join_segments(&self.raw, segments).into()
    }

    fn blob_url(&self, repo: &RepoRef, branch: &str, path: &str) -> String {
        let segments = [repo.owner.as_str(), repo.name.as_str(), "blob", branch].into_iter().chain(path.split('/'));
        join_segments(&self.web, segments).into()
    }
}

fn base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).or_raise(|| ErrorKind::InvalidEndpoint(raw.to_string()))?;
    if url.cannot_be_a_base() {
        exn::bail!(ErrorKind::InvalidEndpoint(raw.to_string()));
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base`. Reserved characters in a
/// segment (`#`, `?`, `%`, ...) are escaped rather than ending the path.
fn join_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url = base.clone();
    // Never fails: `base_url` rejected cannot-be-a-base URLs.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct UserBody {
    login: String,
    name: Option<String>,
    avatar_url: Option<String>,
}
impl From<UserBody> for Identity {
    fn from(user: UserBody) -> Self {
        Self {
            display_name: user.name.filter(|name| !name.is_empty()).unwrap_or_else(|| user.login.clone()),
            login: user.login,
            avatar_url: user.avatar_url,
        }
    }
}

#[derive(Deserialize)]
struct OwnerBody {
    login: String,
}

#[derive(Deserialize)]
struct RepoBody {
    name: String,
    owner: OwnerBody,
    default_branch: Option<String>,
    html_url: String,
}
impl From<RepoBody> for RepoInfo {
    fn from(repo: RepoBody) -> Self {
        Self {
            owner: repo.owner.login,
            name: repo.name,
            default_branch: repo.default_branch.unwrap_or_else(|| "main".to_string()),
            html_url: repo.html_url,
        }
    }
}

#[derive(Deserialize)]
struct TreeBody {
    tree: Vec<TreeItemBody>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeItemBody {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}
impl From<TreeItemBody> for TreeEntry {
    fn from(item: TreeItemBody) -> Self {
        Self {
            kind: EntryKind::from_remote(&item.kind),
            path: item.path,
        }
    }
}

#[derive(Deserialize)]
struct ContentBody {
    name: String,
    path: String,
    download_url: Option<String>,
    html_url: Option<String>,
    #[serde(default)]
    size: u64,
    #[serde(rename = "type")]
    kind: String,
}
impl From<ContentBody> for FolderEntry {
    fn from(item: ContentBody) -> Self {
        Self {
            kind: EntryKind::from_remote(&item.kind),
            name: item.name,
            path: item.path,
            download_url: item.download_url,
            html_url: item.html_url,
            size: item.size,
        }
    }
}

#[derive(Deserialize)]
struct PutBody {
    content: Option<PutContentBody>,
}

#[derive(Deserialize)]
struct PutContentBody {
    path: String,
}

#[derive(Serialize)]
struct CreateRepoRequest<'a> {
    name: &'a str,
    description: &'a str,
    auto_init: bool,
    private: bool,
}

#[derive(Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> GithubStore {
        GithubStore::new("github", Endpoints::default(), Duration::from_secs(5)).unwrap()
    }

    fn repo() -> RepoRef {
        RepoRef::new("octocat", "github-media-gallery")
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = store().contents_url(&repo(), "images/1700000000000_my cat.png");
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octocat/github-media-gallery/contents/images/1700000000000_my%20cat.png"
        );
    }

    #[test]
    fn test_endpoint_with_api_prefix() {
        let endpoints = Endpoints {
            api: "https://ghe.example.com/api/v3/".to_string(),
            ..Endpoints::default()
        };
        let store = GithubStore::new("ghe", endpoints, Duration::from_secs(5)).unwrap();
        assert_eq!(store.endpoint(["user"]).as_str(), "https://ghe.example.com/api/v3/user");
    }

    #[test]
    fn test_invalid_endpoint() {
        let endpoints = Endpoints {
            api: "not a url".to_string(),
            ..Endpoints::default()
        };
        let err = GithubStore::new("broken", endpoints, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidEndpoint(_)));
    }

    #[test]
    fn test_locators() {
        let store = store();
        assert_eq!(
            store.raw_url(&repo(), "main", "audio/1_song.mp3"),
            "https://raw.githubusercontent.com/octocat/github-media-gallery/main/audio/1_song.mp3"
        );
        assert_eq!(
            store.blob_url(&repo(), "main", "audio/1_song.mp3"),
            "https://github.com/octocat/github-media-gallery/blob/main/audio/1_song.mp3"
        );
    }

    #[test]
    fn test_locators_escape_reserved_characters() {
        let store = store();
        let raw = store.raw_url(&repo(), "main", "images/1700000000000_a#b?.png");
        assert_eq!(
            raw,
            "https://raw.githubusercontent.com/octocat/github-media-gallery/main/images/1700000000000_a%23b%3F.png"
        );
        let parsed = Url::parse(&raw).unwrap();
        assert_eq!(parsed.fragment(), None);
        assert_eq!(parsed.query(), None);
        let last = parsed.path_segments().and_then(|mut segments| segments.next_back());
        assert_eq!(last, Some("1700000000000_a%23b%3F.png"));

        let blob = store.blob_url(&repo(), "main", "audio/1_50% off.mp3");
        assert_eq!(blob, "https://github.com/octocat/github-media-gallery/blob/main/audio/1_50%25%20off.mp3");
    }

    #[test]
    fn test_locators_with_trailing_slash_base() {
        let endpoints = Endpoints {
            raw: "https://raw.example.com/".to_string(),
            ..Endpoints::default()
        };
        let store = GithubStore::new("ghe", endpoints, Duration::from_secs(5)).unwrap();
        assert_eq!(
            store.raw_url(&repo(), "main", "images/1_a.png"),
            "https://raw.example.com/octocat/github-media-gallery/main/images/1_a.png"
        );
    }

    #[test]
    fn test_invalid_locator_endpoint() {
        let endpoints = Endpoints {
            web: "mailto:someone@example.com".to_string(),
            ..Endpoints::default()
        };
        let err = GithubStore::new("broken", endpoints, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidEndpoint(_)));
    }

    #[test]
    fn test_decode_user() {
        let user: UserBody =
            serde_json::from_str(r#"{"login":"octocat","name":null,"avatar_url":"https://a/1.png","id":1}"#).unwrap();
        let identity = Identity::from(user);
        assert_eq!(identity.display_name, "octocat");
        assert_eq!(identity.avatar_url.as_deref(), Some("https://a/1.png"));
    }

    #[test]
    fn test_decode_tree() {
        let body = r#"{
            "sha": "abc",
            "tree": [
                {"path": "README.md", "mode": "100644", "type": "blob", "sha": "1"},
                {"path": "images", "mode": "040000", "type": "tree", "sha": "2"},
                {"path": "images/1_a.png", "mode": "100644", "type": "blob", "sha": "3", "size": 10}
            ],
            "truncated": false
        }"#;
        let tree: TreeBody = serde_json::from_str(body).unwrap();
        let entries: Vec<TreeEntry> = tree.tree.into_iter().map(TreeEntry::from).collect();
        assert_eq!(entries[1], TreeEntry { path: "images".to_string(), kind: EntryKind::Directory });
        assert_eq!(entries[2], TreeEntry { path: "images/1_a.png".to_string(), kind: EntryKind::File });
    }

    #[test]
    fn test_decode_folder() {
        let body = r#"[
            {"name": "1_a.png", "path": "images/1_a.png", "size": 42, "type": "file",
             "download_url": "https://raw/1_a.png", "html_url": "https://web/1_a.png"},
            {"name": "nested", "path": "images/nested", "size": 0, "type": "dir",
             "download_url": null, "html_url": "https://web/nested"}
        ]"#;
        let entries: Vec<ContentBody> = serde_json::from_str(body).unwrap();
        let entries: Vec<FolderEntry> = entries.into_iter().map(FolderEntry::from).collect();
        assert_eq!(entries[0].size, 42);
        assert_eq!(entries[0].kind, EntryKind::File);
        assert_eq!(entries[1].kind, EntryKind::Directory);
        assert_eq!(entries[1].download_url, None);
    }

    #[test]
    fn test_encode_requests() {
        let put = PutRequest {
            message: "Add cat.png to media gallery",
            content: "aGVsbG8=",
        };
        assert_eq!(
            serde_json::to_value(&put).unwrap(),
            serde_json::json!({"message": "Add cat.png to media gallery", "content": "aGVsbG8="})
        );
        let create = CreateRepoRequest {
            name: "github-media-gallery",
            description: "media",
            auto_init: true,
            private: false,
        };
        assert_eq!(serde_json::to_value(&create).unwrap()["auto_init"], serde_json::json!(true));
    }
}
