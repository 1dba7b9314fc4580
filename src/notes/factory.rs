//! Note backend factory

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::NotesConfig;

use super::backend::NoteStore;
use super::file_backend::FileNoteStore;
use super::memory_backend::MemoryNoteStore;

/// Create a note backend based on configuration.
///
/// - `"memory"`: Returns a `MemoryNoteStore`
/// - `"file"` (default): Returns a `FileNoteStore` rooted at `dir`
///
/// Unknown backend names fall back to the filesystem backend with a warning.
pub fn create_note_store(settings: &NotesConfig, dir: PathBuf) -> Arc<dyn NoteStore> {
    match settings.backend.as_str() {
        "memory" => {
            tracing::info!(backend = "memory", "Creating in-memory note store");
            Arc::new(MemoryNoteStore::new())
        }
        other => {
            if other != "file" {
                tracing::warn!(
                    backend = %other,
                    "Unknown note backend, falling back to file"
                );
            }
            tracing::info!(backend = "file", dir = %dir.display(), "Creating file note store");
            Arc::new(FileNoteStore::new(dir))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(backend: &str) -> NotesConfig {
        NotesConfig {
            backend: backend.to_string(),
            dir: None,
        }
    }

    #[test]
    fn test_factory_selects_backend() {
        let dir = PathBuf::from("/nonexistent");
        assert_eq!(create_note_store(&config("memory"), dir.clone()).backend_type(), "memory");
        assert_eq!(create_note_store(&config("file"), dir.clone()).backend_type(), "file");
        assert_eq!(create_note_store(&config("bogus"), dir).backend_type(), "file");
    }
}
