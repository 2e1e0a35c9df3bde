use crate::upload::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use std::fmt;
use std::path::{Path, PathBuf};

enum Source {
    /// Read at transfer time.
    Disk(PathBuf),
    Memory(Vec<u8>),
}

/// A file selected for upload.
///
/// The name is what ends up in the stored path (after the timestamp prefix).
/// Files on disk are only read when their turn comes, so a batch never holds
/// more than one file's content in memory.
pub struct LocalFile {
    name: String,
    size: u64,
    source: Source,
}

impl LocalFile {
    /// Describe a file on disk without reading it.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let read_error = || ErrorKind::LocalRead(path.display().to_string());
        let metadata = tokio::fs::metadata(path).await.or_raise(read_error)?;
        if !metadata.is_file() {
            exn::bail!(read_error());
        }
        let name = path.file_name().and_then(|name| name.to_str()).ok_or_raise(read_error)?;
        Ok(Self {
            name: name.to_string(),
            size: metadata.len(),
            source: Source::Disk(path.to_path_buf()),
        })
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            source: Source::Memory(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes as reported when the file was selected.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Full content of the file.
    pub async fn read(&self) -> Result<Vec<u8>> {
        match &self.source {
            Source::Disk(path) => {
                tokio::fs::read(path).await.or_raise(|| ErrorKind::LocalRead(path.display().to_string()))
            },
            Source::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            Source::Disk(path) => path.display().to_string(),
            Source::Memory(_) => "<memory>".to_string(),
        };
        f.debug_struct("LocalFile").field("name", &self.name).field("size", &self.size).field("source", &source).finish()
    }
}
