//! Conditional request handling based on modification time
//!
//! Provides HTTP-date formatting/parsing and the `If-Modified-Since` /
//! `If-Unmodified-Since` checks used for static assets.

use std::time::SystemTime;

use axum::http::{header, HeaderMap, Method};
use chrono::{DateTime, Utc};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Outcome of evaluating the conditional headers of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Serve the full response
    Proceed,
    /// 304 Not Modified
    NotModified,
    /// 412 Precondition Failed
    Failed,
}

/// Format a timestamp as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP date header. Unparseable values yield `None` and are ignored.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn header_date(headers: &HeaderMap, name: header::HeaderName) -> Option<DateTime<Utc>> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_http_date)
}

/// Evaluate `If-Unmodified-Since` and `If-Modified-Since` against the
/// resource's modification time (compared at one-second resolution).
pub fn evaluate(method: &Method, headers: &HeaderMap, modified: Option<SystemTime>) -> Precondition {
    let Some(modified) = modified else {
        return Precondition::Proceed;
    };
    let modified_secs = DateTime::<Utc>::from(modified).timestamp();

    if let Some(since) = header_date(headers, header::IF_UNMODIFIED_SINCE) {
        if modified_secs > since.timestamp() {
            return Precondition::Failed;
        }
    }

    if method == Method::GET || method == Method::HEAD {
        if let Some(since) = header_date(headers, header::IF_MODIFIED_SINCE) {
            if modified_secs <= since.timestamp() {
                return Precondition::NotModified;
            }
        }
    }

    Precondition::Proceed
}
