//! HTTP helpers shared by the dispatcher: content types, conditional
//! requests, byte ranges and static asset responses.

pub mod conditional;
mod mime;
pub mod range;
mod static_files;

pub use conditional::{format_http_date, parse_http_date, Precondition};
pub use mime::guess_mime_type;
pub use range::{evaluate_range, ByteRange, RangeOutcome};
pub use static_files::{serve_static, DEFAULT_CONTENT_TYPE};
