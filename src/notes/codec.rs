//! Gzip + JSON blob encoding shared by the note backends

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::types::{Note, NoteResult};

/// Encode a note as gzipped JSON, the format served verbatim by the API
pub fn encode_note(note: &Note) -> NoteResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    serde_json::to_writer(&mut encoder, note)?;
    encoder.write_all(b"\n")?;
    Ok(encoder.finish()?)
}

/// Decode a gzipped JSON blob back into a note
pub fn decode_note(raw: &[u8]) -> NoteResult<Note> {
    let mut json = Vec::new();
    GzDecoder::new(raw).read_to_end(&mut json)?;
    Ok(serde_json::from_slice(&json)?)
}
