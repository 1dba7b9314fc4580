use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{FileMeta, FileSystem, OpenedFile};
use crate::routing::clean_path;

/// A [`FileSystem`] rooted at a directory on disk.
///
/// Paths are cleaned before being joined to the root, so `..` can never
/// escape it.
#[derive(Debug, Clone)]
pub struct DirFileSystem {
    root: PathBuf,
}

impl DirFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        if path.contains('\0') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid character in file path",
            ));
        }
        let cleaned = clean_path(path);
        let relative = cleaned.trim_start_matches('/');
        if relative.is_empty() {
            Ok(self.root.clone())
        } else {
            Ok(self.root.join(relative))
        }
    }
}

#[async_trait]
impl FileSystem for DirFileSystem {
    async fn open(&self, path: &str) -> io::Result<OpenedFile> {
        let full = self.resolve(path)?;
        let metadata = tokio::fs::metadata(&full).await?;

        let meta = FileMeta {
            is_dir: metadata.is_dir(),
            len: metadata.len(),
            modified: metadata.modified().ok(),
        };

        if meta.is_dir {
            return Ok(OpenedFile {
                meta,
                reader: Box::new(Cursor::new(Vec::new())),
            });
        }

        let file = tokio::fs::File::open(&full).await?;
        Ok(OpenedFile {
            meta,
            reader: Box::new(file),
        })
    }
}
