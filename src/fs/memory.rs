use std::collections::HashMap;
use std::io::{self, Cursor};
use std::time::SystemTime;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{FileMeta, FileSystem, OpenedFile};
use crate::routing::clean_path;

/// In-memory [`FileSystem`], mostly useful for tests and embedded assets.
///
/// Directories are implied by the paths of the files it holds. Every open is
/// counted per path.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: HashMap<String, (Vec<u8>, SystemTime)>,
    opens: DashMap<String, usize>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, stamped with the current time
    pub fn with_file(self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.with_file_modified(path, contents, SystemTime::now())
    }

    pub fn with_file_modified(
        mut self,
        path: &str,
        contents: impl Into<Vec<u8>>,
        modified: SystemTime,
    ) -> Self {
        self.files
            .insert(clean_path(path), (contents.into(), modified));
        self
    }

    /// How many times `path` has been opened (successfully or not)
    pub fn open_count(&self, path: &str) -> usize {
        self.opens.get(&clean_path(path)).map(|c| *c).unwrap_or(0)
    }

    fn is_dir(&self, cleaned: &str) -> bool {
        if cleaned == "/" {
            return true;
        }
        let prefix = format!("{}/", cleaned);
        self.files.keys().any(|k| k.starts_with(&prefix))
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn open(&self, path: &str) -> io::Result<OpenedFile> {
        let cleaned = clean_path(path);
        *self.opens.entry(cleaned.clone()).or_insert(0) += 1;

        if let Some((contents, modified)) = self.files.get(&cleaned) {
            return Ok(OpenedFile {
                meta: FileMeta {
                    is_dir: false,
                    len: contents.len() as u64,
                    modified: Some(*modified),
                },
                reader: Box::new(Cursor::new(contents.clone())),
            });
        }

        if self.is_dir(&cleaned) {
            return Ok(OpenedFile {
                meta: FileMeta {
                    is_dir: true,
                    len: 0,
                    modified: None,
                },
                reader: Box::new(Cursor::new(Vec::new())),
            });
        }

        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("open {}: file does not exist", cleaned),
        ))
    }
}
