//! Filesystem note backend.
//!
//! Notes live under `<dir>/<id[0]>/<id[1]>/<id>` as gzipped JSON. Writes go to
//! a temporary file in the same shard directory and are renamed into place, so
//! readers only ever see a complete blob.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::backend::NoteStore;
use super::codec::encode_note;
use super::types::{note_relative_path, Note, NoteResult, NoteStoreError};

/// Note backend rooted at a directory
pub struct FileNoteStore {
    dir: PathBuf,
}

impl FileNoteStore {
    /// Create a backend rooted at `dir`. The directory is created lazily.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> NoteResult<PathBuf> {
        Ok(self.dir.join(note_relative_path(id)?))
    }
}

fn map_not_found(err: std::io::Error, id: &str) -> NoteStoreError {
    if err.kind() == ErrorKind::NotFound {
        NoteStoreError::NotFound(id.to_string())
    } else {
        NoteStoreError::Io(err)
    }
}

#[async_trait]
impl NoteStore for FileNoteStore {
    fn backend_type(&self) -> &'static str {
        "file"
    }

    async fn exists(&self, id: &str) -> bool {
        match self.path_for(id) {
            Ok(path) => tokio::fs::metadata(&path).await.is_ok(),
            Err(_) => false,
        }
    }

    async fn read_raw(&self, id: &str) -> NoteResult<Vec<u8>> {
        let path = self.path_for(id)?;
        tokio::fs::read(&path).await.map_err(|e| map_not_found(e, id))
    }

    async fn write(&self, id: &str, note: &Note) -> NoteResult<()> {
        let path = self.path_for(id)?;
        let blob = encode_note(note)?;

        let shard = path
            .parent()
            .ok_or_else(|| NoteStoreError::InvalidId(id.to_string()))?;
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o700);
        builder.create(shard).await?;

        let tmp_path = shard.join(format!(".{}.{:016x}.tmp", id, rand::random::<u64>()));

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let result = async {
            let mut file = options.open(&tmp_path).await?;
            file.write_all(&blob).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp_path, &path).await
        }
        .await;

        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        tracing::debug!(note_id = %id, bytes = blob.len(), "Note written");
        Ok(())
    }

    async fn delete(&self, id: &str) -> NoteResult<()> {
        let path = self.path_for(id)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| map_not_found(e, id))?;

        tracing::debug!(note_id = %id, "Note deleted");
        Ok(())
    }
}
