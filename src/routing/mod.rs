//! Request routing.
//!
//! Every request goes through a single fallback handler that normalizes the
//! path, resolves it to a [`RouteDecision`] and executes that decision.

mod decision;
mod dispatcher;
mod path;

pub use decision::{resolve, RouteDecision, API_PREFIX, INDEX_VIEW, NOTE_VIEW};
pub use dispatcher::dispatch;
pub use path::{clean_path, shortlink_candidate, MIN_SHORTLINK_PATH_LEN};
