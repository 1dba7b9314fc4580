//! Note types, identifiers and error definitions

use std::path::PathBuf;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Minimum accepted length of a note identifier
pub const MIN_NOTE_ID_LEN: usize = 4;

/// Number of random bytes behind a freshly minted identifier
const NOTE_ID_BYTES: usize = 32;

/// Note store error type
#[derive(Debug, Error)]
pub enum NoteStoreError {
    #[error("Invalid note id: {0}")]
    InvalidId(String),

    #[error("Note not found: {0}")]
    NotFound(String),

    #[error("Note I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Note encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result type for note store operations
pub type NoteResult<T> = Result<T, NoteStoreError>;

/// The JSON body of a note.
///
/// The server never looks inside `cipher_text`; it is carried as raw bytes
/// and travels as a standard base64 string on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Milliseconds since the epoch
    #[serde(default)]
    pub timestamp: f64,

    /// Raw cipher text
    #[serde(
        default,
        serialize_with = "serialize_cipher_text",
        deserialize_with = "deserialize_cipher_text"
    )]
    pub cipher_text: Vec<u8>,
}

fn serialize_cipher_text<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

fn deserialize_cipher_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded: Option<String> = Option::deserialize(deserializer)?;
    match encoded {
        Some(s) => STANDARD.decode(s).map_err(serde::de::Error::custom),
        None => Ok(Vec::new()),
    }
}

/// Check an id for valid characters and length
pub fn validate_note_id(id: &str) -> NoteResult<()> {
    if !id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(NoteStoreError::InvalidId(
            "invalid characters in note id".to_string(),
        ));
    }

    if id.len() < MIN_NOTE_ID_LEN {
        return Err(NoteStoreError::InvalidId("note id is too short".to_string()));
    }

    Ok(())
}

/// Whether `id` is an acceptable note identifier
pub fn is_valid_note_id(id: &str) -> bool {
    validate_note_id(id).is_ok()
}

/// Mint a new note id: url-safe base64 of random bytes, long enough that
/// collisions are not a concern.
pub fn generate_note_id() -> String {
    let bytes: [u8; NOTE_ID_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Sharded relative path of a note: `a/b/abcdef`
pub fn note_relative_path(id: &str) -> NoteResult<PathBuf> {
    validate_note_id(id)?;

    Ok(PathBuf::from(&id[0..1]).join(&id[1..2]).join(id))
}
