//! Backend trait for note storage.
//!
//! This module defines the abstraction layer for note backends, allowing
//! different storage implementations (filesystem, memory) to be used
//! interchangeably by the dispatcher and the API.

use async_trait::async_trait;

use super::codec::decode_note;
use super::types::{Note, NoteResult};

/// Key → blob storage for notes.
///
/// Every operation validates the id first, so an id that fails
/// [`validate_note_id`](super::validate_note_id) is rejected by all of them
/// (and `exists` reports `false`). Individual reads and writes are atomic
/// from the caller's point of view.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Backend type identifier, used for logging
    fn backend_type(&self) -> &'static str;

    /// Whether a note with this id is stored
    async fn exists(&self, id: &str) -> bool;

    /// Raw stored bytes (gzipped JSON)
    async fn read_raw(&self, id: &str) -> NoteResult<Vec<u8>>;

    /// Create or replace a note
    async fn write(&self, id: &str, note: &Note) -> NoteResult<()>;

    /// Remove a note
    async fn delete(&self, id: &str) -> NoteResult<()>;

    /// Read and decode a note
    async fn read(&self, id: &str) -> NoteResult<Note> {
        let raw = self.read_raw(id).await?;
        decode_note(&raw)
    }
}
