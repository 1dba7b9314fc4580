//! API layer - JSON note endpoints under `/api/`.

mod notes;
mod routes;

pub use notes::{create_note, delete_note, get_note, update_note};
pub use routes::route_api;
