//! Single byte-range requests (`Range: bytes=…`)
//!
//! Only one range is honoured. Multi-range, other units and malformed
//! headers are ignored and the full asset is served.

use std::time::SystemTime;

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};

use super::conditional::parse_http_date;

/// An inclusive byte range within a file of known length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for a file of `size` bytes
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// Serve the partial content
    Partial(ByteRange),
    /// 416 Range Not Satisfiable
    NotSatisfiable,
    /// No usable range: serve everything
    Full,
}

/// Parse a `Range` header value against a file of `size` bytes
pub fn parse_range(value: &str, size: u64) -> RangeOutcome {
    let Some(spec) = value.trim().strip_prefix("bytes=") else {
        return RangeOutcome::Full;
    };
    if spec.contains(',') {
        return RangeOutcome::Full;
    }
    let Some((first, last)) = spec.split_once('-') else {
        return RangeOutcome::Full;
    };
    let (first, last) = (first.trim(), last.trim());

    // "-N": the final N bytes
    if first.is_empty() {
        let Ok(suffix) = last.parse::<u64>() else {
            return RangeOutcome::Full;
        };
        if suffix == 0 || size == 0 {
            return RangeOutcome::NotSatisfiable;
        }
        return RangeOutcome::Partial(ByteRange {
            start: size.saturating_sub(suffix),
            end: size - 1,
        });
    }

    let Ok(start) = first.parse::<u64>() else {
        return RangeOutcome::Full;
    };
    let end = if last.is_empty() {
        None
    } else {
        match last.parse::<u64>() {
            Ok(end) => Some(end),
            Err(_) => return RangeOutcome::Full,
        }
    };

    if let Some(end) = end {
        if end < start {
            return RangeOutcome::Full;
        }
    }
    if start >= size {
        return RangeOutcome::NotSatisfiable;
    }

    let end = end.map_or(size - 1, |end| end.min(size - 1));
    RangeOutcome::Partial(ByteRange { start, end })
}

/// `If-Range` holds when it is absent, or names the current modification
/// time. Entity tags never match: assets carry none.
fn if_range_holds(headers: &HeaderMap, modified: Option<SystemTime>) -> bool {
    let Some(value) = headers.get(header::IF_RANGE) else {
        return true;
    };
    let (Some(since), Some(modified)) = (
        value.to_str().ok().and_then(parse_http_date),
        modified,
    ) else {
        return false;
    };
    DateTime::<Utc>::from(modified).timestamp() == since.timestamp()
}

/// Evaluate `Range` and `If-Range` for a file
pub fn evaluate_range(headers: &HeaderMap, size: u64, modified: Option<SystemTime>) -> RangeOutcome {
    let Some(value) = headers.get(header::RANGE).and_then(|v| v.to_str().ok()) else {
        return RangeOutcome::Full;
    };
    if !if_range_holds(headers, modified) {
        return RangeOutcome::Full;
    }
    parse_range(value, size)
}
