use crate::clock::Clock;
use crate::codec::encode_path;
use crate::session::Session;
use crate::upload::error::{ErrorKind, Result};
use crate::upload::{UploadEvent, UploadRequest};
use async_stream::stream;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use exn::ResultExt;
use futures::Stream;
use gallery_remote::StoreHandle;

/// Commit message recorded for each uploaded file.
pub(crate) fn commit_message(filename: &str) -> String {
    format!("Add {filename} to media gallery")
}

/// Streams [`UploadEvent`]s while writing every file in `request` to the
/// session's repository, one at a time.
///
/// The stream yields events in the order documented on [`UploadEvent`]. Any
/// error ends the stream: a preflight rejection before `Started`, an
/// [`UploadAborted`](ErrorKind::UploadAborted) naming the file that failed, or
/// [`FileTooLarge`](ErrorKind::FileTooLarge) if a file grew past the limit
/// after it was selected.
pub fn upload<'a>(
    store: &'a StoreHandle,
    session: &'a Session,
    clock: &'a dyn Clock,
    request: UploadRequest,
) -> impl Stream<Item = Result<UploadEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        if let Err(err) = preflight(&request) {
            yield Err(err);
            return;
        }
        let total = request.files.len();
        tracing::info!(total, media_type = %request.media_type, "Uploading batch");
        yield Ok(UploadEvent::Started { total });

        for (offset, file) in request.files.iter().enumerate() {
            let index = offset + 1;
            let filename = file.name().to_string();
            yield Ok(UploadEvent::Uploading { index, total, filename: filename.clone() });

            let path = encode_path(request.media_type, &filename, clock.now_millis());
            let aborted = || ErrorKind::UploadAborted { index, filename: filename.clone() };
            let bytes = match file.read().await {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::error!(index, %filename, "Reading local file failed; stopping batch");
                    yield Err(err.raise(aborted()));
                    return;
                },
            };
            // The file may have grown since it was selected.
            let size = bytes.len() as u64;
            if size > request.max_file_size {
                tracing::error!(index, %filename, size, "Local file grew past the size limit; stopping batch");
                let limit = request.max_file_size;
                yield Err(exn::Exn::from(ErrorKind::FileTooLarge { name: filename.clone(), size, limit }));
                return;
            }
            let content = STANDARD.encode(bytes);
            let receipt = store
                .put_file(session.repository(), &path, &content, &commit_message(&filename), session.token())
                .await
                .or_raise(|| ErrorKind::Storage);
            match receipt {
                Ok(receipt) => {
                    tracing::debug!(index, path = %receipt.path, "File uploaded");
                    yield Ok(UploadEvent::Uploaded { index, total, path: receipt.path });
                },
                Err(err) => {
                    tracing::error!(index, %filename, "Remote write failed; stopping batch");
                    yield Err(err.raise(aborted()));
                    return;
                },
            }
        }

        yield Ok(UploadEvent::Complete);
    })
}

/// Reject the whole batch before anything touches the network.
fn preflight(request: &UploadRequest) -> Result<()> {
    for file in &request.files {
        let name = file.name();
        if name.trim().is_empty() || name.contains(['/', '\\', '\0']) || name == "." || name == ".." {
            exn::bail!(ErrorKind::InvalidFileName(name.to_string()));
        }
        if file.size() > request.max_file_size {
            exn::bail!(ErrorKind::FileTooLarge {
                name: name.to_string(),
                size: file.size(),
                limit: request.max_file_size,
            });
        }
    }
    Ok(())
}
