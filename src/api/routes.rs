use axum::{
    body::Bytes,
    http::Method,
    response::{IntoResponse, Response},
};

use super::notes::{create_note, delete_note, get_note, update_note};
use crate::error::AppError;
use crate::server::AppState;

/// Route an `/api/` request by exact segment count and verb.
///
/// `path` must already be normalized.
pub async fn route_api(state: &AppState, method: &Method, path: &str, body: Bytes) -> Response {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    let result = match segments.as_slice() {
        ["api", "note"] if method == Method::POST => create_note(state, &body).await,
        ["api", "note", id] if method == Method::GET => get_note(state, id).await,
        ["api", "note", id] if method == Method::POST || method == Method::PUT => {
            update_note(state, id, &body).await
        }
        ["api", "note", id] if method == Method::DELETE => delete_note(state, id).await,
        _ => Err(AppError::not_found()),
    };

    result.into_response()
}
