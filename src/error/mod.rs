//! Request error reporting.
//!
//! Internal faults are turned into a response that carries only a public
//! message and an opaque correlation id (in the body and the `x-error-id`
//! header). The full error chain and the call site are logged together with
//! the same id, so a client report can be matched to the log entry.
//! Not-found conditions are not faults: they produce a plain 404 without an
//! id.

use std::borrow::Cow;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Response header carrying the correlation id
pub const ERROR_ID_HEADER: HeaderName = HeaderName::from_static("x-error-id");

/// Body of every 404
pub const NOT_FOUND_BODY: &str = "404 page not found";

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure classes, each with a fixed status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    UpstreamFailure,
    TemplateResolution,
    TemplateExecution,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::UpstreamFailure
            | ErrorKind::TemplateResolution
            | ErrorKind::TemplateExecution => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::UpstreamFailure => "UPSTREAM_FAILURE",
            ErrorKind::TemplateResolution => "TEMPLATE_RESOLUTION",
            ErrorKind::TemplateExecution => "TEMPLATE_EXECUTION",
        }
    }
}

/// Error returned by request handlers
#[derive(Debug, Error)]
#[error("{public_message} ({location})")]
pub struct AppError {
    kind: ErrorKind,
    public_message: Cow<'static, str>,
    location: &'static Location<'static>,
    #[source]
    source: Option<BoxError>,
}

impl AppError {
    #[track_caller]
    fn new(
        kind: ErrorKind,
        public_message: impl Into<Cow<'static, str>>,
        source: Option<BoxError>,
    ) -> Self {
        Self {
            kind,
            public_message: public_message.into(),
            location: Location::caller(),
            source,
        }
    }

    #[track_caller]
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound, NOT_FOUND_BODY, None)
    }

    #[track_caller]
    pub fn bad_request(
        public_message: impl Into<Cow<'static, str>>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::new(ErrorKind::BadRequest, public_message, Some(source.into()))
    }

    #[track_caller]
    pub fn upstream(
        public_message: impl Into<Cow<'static, str>>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::new(ErrorKind::UpstreamFailure, public_message, Some(source.into()))
    }

    #[track_caller]
    pub fn template_resolution(source: impl Into<BoxError>) -> Self {
        Self::new(
            ErrorKind::TemplateResolution,
            "internal error",
            Some(source.into()),
        )
    }

    #[track_caller]
    pub fn template_execution(source: impl Into<BoxError>) -> Self {
        Self::new(
            ErrorKind::TemplateExecution,
            "internal error",
            Some(source.into()),
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn public_message(&self) -> &str {
        &self.public_message
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// The internal error and its causes, joined with `: `
    pub fn detail(&self) -> String {
        match &self.source {
            Some(source) => error_chain(source.as_ref()),
            None => self.public_message.to_string(),
        }
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        current = cause.source();
    }
    out
}

static ERROR_SEED: OnceLock<u64> = OnceLock::new();
static ERROR_SEQ: AtomicU64 = AtomicU64::new(0);

/// Multiplier that spreads consecutive sequence numbers across the id space
const SEQ_SPREAD: u64 = 0x9E37_79B9_7F4A_7C15;

/// Generate a correlation id.
///
/// A process-wide random seed (mixed with the start time) plus an odd
/// multiple of a counter: distinct for every call within the process and
/// unlikely to repeat across processes.
pub fn new_error_id() -> String {
    let seed = *ERROR_SEED.get_or_init(|| {
        rand::random::<u64>() ^ chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0) as u64
    });
    let seq = ERROR_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{:x}", seed.wrapping_add(seq.wrapping_mul(SEQ_SPREAD)))
}

/// Generate an id that does not occur in `detail`
fn error_id_for(detail: &str) -> String {
    loop {
        let id = new_error_id();
        if !detail.contains(&id) {
            return id;
        }
    }
}

fn plain_text(status: StatusCode, body: String) -> Response {
    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.kind.status();

        if self.kind == ErrorKind::NotFound {
            tracing::debug!(location = %self.location, "Not found");
            return plain_text(status, format!("{}\n", NOT_FOUND_BODY));
        }

        let detail = self.detail();
        let error_id = error_id_for(&detail);

        // Always log the detailed error server-side
        tracing::error!(
            error_id = %error_id,
            code = %self.kind.code(),
            status = %status.as_u16(),
            location = %self.location,
            error = %detail,
            "Request error"
        );

        let body = format!(
            "Error serving request (id={:?}) {}\n",
            error_id, self.public_message
        );
        let mut response = plain_text(status, body);
        if let Ok(value) = HeaderValue::from_str(&error_id) {
            response.headers_mut().insert(ERROR_ID_HEADER, value);
        }
        response
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_error_ids_are_distinct() {
        let ids: HashSet<String> = (0..1000).map(|_| new_error_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_error_id_avoids_detail_text() {
        let id = new_error_id();
        // whatever comes next must differ from an id already in the text
        let next = error_id_for(&format!("failure mentioning {}", id));
        assert_ne!(next, id);
    }

    #[test]
    fn test_location_is_call_site() {
        let err = AppError::upstream("error writing", std::io::Error::other("disk full"));
        assert_eq!(err.location().file(), file!());
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
        assert_eq!(err.detail(), "disk full");
    }

    #[test]
    fn test_fault_response_hides_detail() {
        let err = AppError::upstream("error writing", std::io::Error::other("/var/data/secret"));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let id = response
            .headers()
            .get(ERROR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap();
        assert!(!id.is_empty());
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_not_found_has_no_error_id() {
        let response = AppError::not_found().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(ERROR_ID_HEADER).is_none());
    }

    #[test]
    fn test_kind_status_codes() {
        assert_eq!(ErrorKind::BadRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorKind::TemplateResolution.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorKind::TemplateExecution.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
