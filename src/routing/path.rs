//! Request path normalization and shortlink detection.

use crate::notes::is_valid_note_id;

/// Minimum cleaned path length (leading slash included) that can be a shortlink
pub const MIN_SHORTLINK_PATH_LEN: usize = 5;

/// Lexically normalize a slash-separated path into an absolute one.
///
/// Empty and `.` segments are dropped, `..` removes the previous segment and
/// never climbs above the root. The result always starts with `/` and never
/// ends with one, except for the root itself.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for segment in &segments {
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    if cleaned.is_empty() {
        cleaned.push('/');
    }
    cleaned
}

/// The note id a cleaned path would name if it were a shortlink.
///
/// Candidates are single-segment paths of at least
/// [`MIN_SHORTLINK_PATH_LEN`] characters without any `.`, whose segment is
/// also a well-formed note id.
pub fn shortlink_candidate(cleaned: &str) -> Option<&str> {
    if cleaned.len() < MIN_SHORTLINK_PATH_LEN || cleaned.contains('.') {
        return None;
    }
    let id = cleaned.strip_prefix('/')?;
    if id.contains('/') || !is_valid_note_id(id) {
        return None;
    }
    Some(id)
}
