//! File collaborators for views, includes and static assets.
//!
//! A [`FileSystem`] opens a slash-separated path and returns the file's
//! metadata together with a reader. Directories open successfully with
//! `is_dir` set, so callers decide whether a directory counts as a hit.

mod dir;
mod memory;

use std::io;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek};

pub use dir::DirFileSystem;
pub use memory::MemoryFileSystem;

/// Metadata of an opened entry
#[derive(Debug, Clone, Copy)]
pub struct FileMeta {
    pub is_dir: bool,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

/// Readable, seekable contents of an opened file
pub trait FileReader: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> FileReader for T {}

/// An opened file. Dropping it releases the underlying handle.
pub struct OpenedFile {
    pub meta: FileMeta,
    pub reader: Box<dyn FileReader>,
}

impl OpenedFile {
    /// Read the whole file into memory
    pub async fn read_to_end(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.meta.len as usize);
        self.reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Read the whole file as UTF-8 text
    pub async fn read_to_string(self) -> io::Result<String> {
        let bytes = self.read_to_end().await?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl std::fmt::Debug for OpenedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedFile").field("meta", &self.meta).finish()
    }
}

/// Open-or-fail lookup by path
#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn open(&self, path: &str) -> io::Result<OpenedFile>;
}
