use std::path::Path;
use std::sync::Arc;

use crate::config::Settings;
use crate::fs::{DirFileSystem, FileSystem};
use crate::notes::{create_note_store, NoteStore};

/// Directory under the base dir holding view templates
pub const VIEWS_DIR: &str = "views";
/// Directory under the base dir holding included templates
pub const INCLUDES_DIR: &str = "includes";
/// Directory under the base dir holding static assets
pub const STATIC_DIR: &str = "static";

/// Collaborators shared by every request
#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<dyn NoteStore>,
    pub views: Arc<dyn FileSystem>,
    pub includes: Arc<dyn FileSystem>,
    pub statics: Arc<dyn FileSystem>,
}

impl AppState {
    /// Wire the on-disk collaborators below `base_dir`
    pub fn new(settings: &Settings, base_dir: &Path) -> Self {
        let notes = create_note_store(&settings.notes, settings.notes_dir(base_dir));

        Self::with_collaborators(
            notes,
            Arc::new(DirFileSystem::new(base_dir.join(VIEWS_DIR))),
            Arc::new(DirFileSystem::new(base_dir.join(INCLUDES_DIR))),
            Arc::new(DirFileSystem::new(base_dir.join(STATIC_DIR))),
        )
    }

    pub fn with_collaborators(
        notes: Arc<dyn NoteStore>,
        views: Arc<dyn FileSystem>,
        includes: Arc<dyn FileSystem>,
        statics: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            notes,
            views,
            includes,
            statics,
        }
    }
}
