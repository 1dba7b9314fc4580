//! Route resolution: one [`RouteDecision`] per request, first match wins.

use std::io;

use crate::fs::{FileSystem, OpenedFile};
use crate::server::AppState;

use super::path::{clean_path, shortlink_candidate};

/// Prefix of everything handled by the API sub-router
pub const API_PREFIX: &str = "/api/";

/// View rendered for a shortlink hit
pub const NOTE_VIEW: &str = "/note.html";

/// View served for `/`
pub const INDEX_VIEW: &str = "/index.html";

/// What the dispatcher will do with a request
#[derive(Debug)]
pub enum RouteDecision {
    /// An existing note was named directly; render the note view for it
    ShortlinkRewrite { note_id: String, view: OpenedFile },
    /// Hand the request to the API sub-router
    ApiCall { path: String },
    /// Compose and render a view template
    ViewTemplate { path: String, view: OpenedFile },
    /// Stream a static asset
    StaticAsset { path: String, file: OpenedFile },
    NotFound,
}

impl RouteDecision {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ShortlinkRewrite { .. } => "shortlink",
            Self::ApiCall { .. } => "api",
            Self::ViewTemplate { .. } => "view",
            Self::StaticAsset { .. } => "static",
            Self::NotFound => "not_found",
        }
    }
}

/// Open `path` and keep it only if it is a regular file
async fn open_file(fs: &dyn FileSystem, path: &str, source: &'static str) -> Option<OpenedFile> {
    match fs.open(path).await {
        Ok(file) if !file.meta.is_dir => Some(file),
        Ok(_) => None,
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::debug!(path = %path, source, error = %e, "Lookup failed, falling through");
            None
        }
    }
}

/// Resolve the raw request path against the note store and the file
/// collaborators.
pub async fn resolve(state: &AppState, raw_path: &str) -> RouteDecision {
    let mut path = clean_path(raw_path);
    let mut note_id = None;

    if let Some(id) = shortlink_candidate(&path) {
        if state.notes.exists(id).await {
            note_id = Some(id.to_string());
            path = NOTE_VIEW.to_string();
        }
    }

    if path.starts_with(API_PREFIX) {
        return RouteDecision::ApiCall { path };
    }

    if path == "/" {
        path = INDEX_VIEW.to_string();
    }

    if let Some(view) = open_file(state.views.as_ref(), &path, "views").await {
        return match note_id {
            Some(note_id) => RouteDecision::ShortlinkRewrite { note_id, view },
            None => RouteDecision::ViewTemplate { path, view },
        };
    }

    if let Some(file) = open_file(state.statics.as_ref(), &path, "static").await {
        return RouteDecision::StaticAsset { path, file };
    }

    RouteDecision::NotFound
}
