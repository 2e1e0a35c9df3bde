//! Upload pipeline.
//!
//! A batch is a list of [`LocalFile`]s sharing one [`MediaType`]. Files are
//! written strictly one after another; the first failure stops the batch and
//! nothing is retried or rolled back. Size limits are enforced for the whole
//! batch before the first write.

pub mod error;
mod file;
mod stream;

pub use self::file::LocalFile;
pub use self::stream::upload;

use self::error::Result;
use crate::MAX_FILE_SIZE;
use crate::clock::Clock;
use crate::codec::MediaType;
use crate::session::Session;
use futures::StreamExt;
use gallery_remote::StoreHandle;
use tracing::instrument;

/// Progress events emitted by [`upload`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) exactly once.
/// 2. For each file, [`Uploading`](Self::Uploading) before the transfer and
///    [`Uploaded`](Self::Uploaded) after it.
/// 3. [`Complete`](Self::Complete) exactly once, only if every file was
///    written.
///
/// An error terminates the stream early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Started { total: usize },
    /// File `index` (1-based) of `total` is about to be sent.
    Uploading { index: usize, total: usize, filename: String },
    /// File `index` of `total` was written to `path`.
    Uploaded { index: usize, total: usize, path: String },
    Complete,
}

/// A batch of files to upload as one media type.
#[derive(Debug)]
pub struct UploadRequest {
    pub files: Vec<LocalFile>,
    pub media_type: MediaType,
    /// Defaults to [`MAX_FILE_SIZE`].
    pub max_file_size: u64,
}

impl UploadRequest {
    pub fn new(files: Vec<LocalFile>, media_type: MediaType) -> Self {
        Self {
            files,
            media_type,
            max_file_size: MAX_FILE_SIZE,
        }
    }

    pub fn with_max_file_size(mut self, limit: u64) -> Self {
        self.max_file_size = limit;
        self
    }
}

/// Run [`upload`] to completion, handing every event to `on_progress`.
///
/// Returns the stored paths in upload order.
#[instrument(skip_all, fields(store = store.name(), repository = %session.repository(), files = request.files.len()))]
pub async fn upload_all(
    store: &StoreHandle,
    session: &Session,
    clock: &dyn Clock,
    request: UploadRequest,
    mut on_progress: impl FnMut(&UploadEvent),
) -> Result<Vec<String>> {
    let mut paths = Vec::with_capacity(request.files.len());
    let events = upload(store, session, clock, request);
    let mut events = std::pin::pin!(events);
    while let Some(event) = events.next().await {
        let event = event?;
        on_progress(&event);
        if let UploadEvent::Uploaded { path, .. } = event {
            paths.push(path);
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::error::ErrorKind;
    use super::stream::commit_message;
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use gallery_remote::backend::{Call, Fault, MockStore};
    use gallery_remote::{Identity, RepoRef, Token};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    const REPO: &str = "gallery";

    /// Ticks forward one millisecond per call.
    struct TickingClock(AtomicI64);
    impl Clock for TickingClock {
        fn now_millis(&self) -> i64 {
            self.0.fetch_add(1, Ordering::SeqCst)
        }
    }

    fn clock() -> TickingClock {
        TickingClock(AtomicI64::new(1_700_000_000_000))
    }

    fn session() -> Session {
        let identity = Identity {
            login: "octocat".to_string(),
            display_name: "octocat".to_string(),
            avatar_url: None,
        };
        Session::new(identity, RepoRef::new("octocat", REPO), "main", Token::new("t"))
    }

    fn puts(mock: &MockStore) -> Vec<Call> {
        mock.calls().into_iter().filter(|call| matches!(call, Call::PutFile { .. })).collect()
    }

    #[tokio::test]
    async fn test_oversize_file_rejects_batch_before_any_write() {
        let mock = Arc::new(MockStore::new("octocat").with_repository(REPO));
        let store: StoreHandle = mock.clone();
        let request = UploadRequest::new(
            vec![LocalFile::from_bytes("small.png", vec![0u8; 10]), LocalFile::from_bytes("huge.mp4", vec![0u8; 26 * 1024 * 1024])],
            MediaType::Video,
        );
        let mut events = Vec::new();
        let err = upload_all(&store, &session(), &clock(), request, |event| events.push(event.clone())).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::FileTooLarge { name, size, limit }
            if name == "huge.mp4" && *size == 26 * 1024 * 1024 && *limit == MAX_FILE_SIZE));
        assert!(events.is_empty());
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_file_exactly_at_limit_is_accepted() {
        let mock = Arc::new(MockStore::new("octocat").with_repository(REPO));
        let store: StoreHandle = mock.clone();
        let request = UploadRequest::new(vec![LocalFile::from_bytes("edge.png", vec![1u8; 64])], MediaType::Image)
            .with_max_file_size(64);
        let paths = upload_all(&store, &session(), &clock(), request, |_| {}).await.unwrap();
        assert_eq!(paths, vec!["images/1700000000000_edge.png"]);
    }

    #[tokio::test]
    async fn test_sequential_batch_with_progress() {
        let mock = Arc::new(MockStore::new("octocat").with_repository(REPO));
        let store: StoreHandle = mock.clone();
        let request = UploadRequest::new(
            vec![
                LocalFile::from_bytes("a.mp3", b"one".to_vec()),
                LocalFile::from_bytes("b.mp3", b"two".to_vec()),
                LocalFile::from_bytes("c.mp3", b"three".to_vec()),
            ],
            MediaType::Audio,
        );

        // (index, writes already issued) seen at each `Uploading` event.
        let mut progress = Vec::new();
        let mut events = Vec::new();
        let paths = upload_all(&store, &session(), &clock(), request, |event| {
            if let UploadEvent::Uploading { index, total, .. } = event {
                assert_eq!(*total, 3);
                progress.push((*index, puts(&mock).len()));
            }
            events.push(event.clone());
        })
        .await
        .unwrap();

        assert_eq!(progress, vec![(1, 0), (2, 1), (3, 2)]);
        assert_eq!(paths, vec!["audio/1700000000000_a.mp3", "audio/1700000000001_b.mp3", "audio/1700000000002_c.mp3"]);
        assert_eq!(events.first(), Some(&UploadEvent::Started { total: 3 }));
        assert_eq!(events.last(), Some(&UploadEvent::Complete));
        assert_eq!(events.len(), 8);
        assert_eq!(
            puts(&mock)[1],
            Call::PutFile {
                repository: REPO.to_string(),
                path: "audio/1700000000001_b.mp3".to_string(),
                message: "Add b.mp3 to media gallery".to_string(),
            }
        );
        assert_eq!(mock.encoded(REPO, "audio/1700000000002_c.mp3").await, Some(STANDARD.encode(b"three")));
    }

    #[tokio::test]
    async fn test_first_failure_stops_batch() {
        let mock = Arc::new(MockStore::new("octocat").with_repository(REPO).with_fault(Fault::PutCall(2)));
        let store: StoreHandle = mock.clone();
        let request = UploadRequest::new(
            vec![
                LocalFile::from_bytes("1.png", b"a".to_vec()),
                LocalFile::from_bytes("2.png", b"b".to_vec()),
                LocalFile::from_bytes("3.png", b"c".to_vec()),
            ],
            MediaType::Image,
        );
        let mut completed = false;
        let err = upload_all(&store, &session(), &clock(), request, |event| completed |= *event == UploadEvent::Complete)
            .await
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::UploadAborted { index: 2, filename } if filename == "2.png"));
        assert!(!completed);
        assert_eq!(puts(&mock).len(), 2);
        assert_eq!(mock.files(REPO).await, vec!["images/1700000000000_1.png"]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let mock = Arc::new(MockStore::new("octocat").with_repository(REPO));
        let store: StoreHandle = mock.clone();
        let mut events = Vec::new();
        let paths = upload_all(&store, &session(), &clock(), UploadRequest::new(vec![], MediaType::Image), |event| {
            events.push(event.clone())
        })
        .await
        .unwrap();
        assert!(paths.is_empty());
        assert_eq!(events, vec![UploadEvent::Started { total: 0 }, UploadEvent::Complete]);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_file_name_rejected() {
        let mock = Arc::new(MockStore::new("octocat").with_repository(REPO));
        let store: StoreHandle = mock.clone();
        let request = UploadRequest::new(vec![LocalFile::from_bytes("../escape.png", b"x".to_vec())], MediaType::Image);
        let err = upload_all(&store, &session(), &clock(), request, |_| {}).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidFileName(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_local_read_failure_aborts() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("vanishing.mp4");
        tokio::fs::write(&path, b"data").await.unwrap();
        let file = LocalFile::from_path(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        let mock = Arc::new(MockStore::new("octocat").with_repository(REPO));
        let store: StoreHandle = mock.clone();
        let request = UploadRequest::new(vec![file], MediaType::Video);
        let err = upload_all(&store, &session(), &clock(), request, |_| {}).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::UploadAborted { index: 1, .. }));
        assert!(puts(&mock).is_empty());
    }

    #[tokio::test]
    async fn test_file_grown_past_limit_is_not_sent() {
        let dir = tempfile::TempDir::new().unwrap();
        let grows = dir.path().join("grows.png");
        tokio::fs::write(&grows, b"tiny").await.unwrap();
        let first = LocalFile::from_bytes("first.png", b"ok".to_vec());
        let second = LocalFile::from_path(&grows).await.unwrap();
        tokio::fs::write(&grows, vec![0u8; 16]).await.unwrap();

        let mock = Arc::new(MockStore::new("octocat").with_repository(REPO));
        let store: StoreHandle = mock.clone();
        let request = UploadRequest::new(vec![first, second], MediaType::Image).with_max_file_size(8);
        let mut completed = false;
        let err = upload_all(&store, &session(), &clock(), request, |event| completed |= *event == UploadEvent::Complete)
            .await
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::FileTooLarge { name, size: 16, limit: 8 } if name == "grows.png"));
        assert!(!completed);
        assert_eq!(mock.files(REPO).await, vec!["images/1700000000000_first.png"]);
        assert_eq!(puts(&mock).len(), 1);
    }

    #[test]
    fn test_commit_message() {
        assert_eq!(commit_message("cat.png"), "Add cat.png to media gallery");
    }
}
