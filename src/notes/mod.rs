//! Note storage.
//!
//! This module provides:
//! - The `Note` payload and note id rules (`^[A-Za-z0-9_-]+$`, at least 4 chars)
//! - The `NoteStore` backend trait
//! - Filesystem (sharded, atomic rename) and in-memory backends
//! - A factory selecting the backend from configuration
//!
//! Stored blobs are gzipped JSON and are served verbatim by `GET /api/note/{id}`.

mod backend;
mod codec;
mod factory;
mod file_backend;
mod memory_backend;
mod types;

pub use backend::NoteStore;
pub use codec::{decode_note, encode_note};
pub use factory::create_note_store;
pub use file_backend::FileNoteStore;
pub use memory_backend::MemoryNoteStore;
pub use types::{
    generate_note_id, is_valid_note_id, note_relative_path, validate_note_id, Note, NoteResult,
    NoteStoreError, MIN_NOTE_ID_LEN,
};
