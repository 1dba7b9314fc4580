//! In-memory note backend using DashMap.
//!
//! Blobs are kept in the same gzipped JSON form as the filesystem backend and
//! are lost on restart.

use async_trait::async_trait;
use dashmap::DashMap;

use super::backend::NoteStore;
use super::codec::encode_note;
use super::types::{validate_note_id, Note, NoteResult, NoteStoreError};

/// In-memory note backend
#[derive(Default)]
pub struct MemoryNoteStore {
    notes: DashMap<String, Vec<u8>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notes
    pub fn count(&self) -> usize {
        self.notes.len()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn exists(&self, id: &str) -> bool {
        validate_note_id(id).is_ok() && self.notes.contains_key(id)
    }

    async fn read_raw(&self, id: &str) -> NoteResult<Vec<u8>> {
        validate_note_id(id)?;
        self.notes
            .get(id)
            .map(|blob| blob.value().clone())
            .ok_or_else(|| NoteStoreError::NotFound(id.to_string()))
    }

    async fn write(&self, id: &str, note: &Note) -> NoteResult<()> {
        validate_note_id(id)?;
        let blob = encode_note(note)?;
        self.notes.insert(id.to_string(), blob);
        Ok(())
    }

    async fn delete(&self, id: &str) -> NoteResult<()> {
        validate_note_id(id)?;
        self.notes
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| NoteStoreError::NotFound(id.to_string()))
    }
}
