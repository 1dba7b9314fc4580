//! Template error definitions and the per-request render context

use serde::Serialize;
use thiserror::Error;

/// Name under which the requested view is registered
pub const ROOT_TEMPLATE: &str = "__page__";

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template: {name}:{line}: {message}")]
    Parse {
        name: String,
        line: usize,
        message: String,
    },

    #[error("template: include {name:?} could not be loaded")]
    MissingInclude {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("template: {name}:{line}: {message}")]
    Execution {
        name: String,
        line: usize,
        message: String,
    },
}

impl TemplateError {
    /// Name of the template the error is about
    pub fn template_name(&self) -> &str {
        match self {
            TemplateError::Parse { name, .. }
            | TemplateError::MissingInclude { name, .. }
            | TemplateError::Execution { name, .. } => name,
        }
    }
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Data a view is executed against.
///
/// Templates see it as `note_id` (none unless the request was a shortlink).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderContext {
    pub note_id: Option<String>,
}

impl RenderContext {
    pub fn for_note(note_id: impl Into<String>) -> Self {
        Self {
            note_id: Some(note_id.into()),
        }
    }
}
