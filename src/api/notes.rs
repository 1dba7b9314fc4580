//! Note endpoints.

use axum::{
    body::Bytes,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::notes::{generate_note_id, Note, NoteStoreError};
use crate::server::AppState;

fn decode_body(body: &[u8]) -> Result<Note> {
    serde_json::from_slice(body).map_err(|e| AppError::bad_request("error decoding", e))
}

/// GET /api/note/{id} - Stored gzip blob, passed through untouched
#[tracing::instrument(name = "http.get_note", skip(state))]
pub async fn get_note(state: &AppState, id: &str) -> Result<Response> {
    let raw = match state.notes.read_raw(id).await {
        Ok(raw) => raw,
        Err(NoteStoreError::NotFound(_) | NoteStoreError::InvalidId(_)) => {
            return Err(AppError::not_found())
        }
        Err(e) => return Err(AppError::upstream("error getting note", e)),
    };

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (header::CONTENT_ENCODING, HeaderValue::from_static("gzip")),
        ],
        raw,
    )
        .into_response())
}

/// POST /api/note - Store a note under a freshly minted id
#[tracing::instrument(name = "http.create_note", skip(state, body), fields(note_id = tracing::field::Empty))]
pub async fn create_note(state: &AppState, body: &Bytes) -> Result<Response> {
    let note = decode_body(body)?;
    let id = generate_note_id();
    tracing::Span::current().record("note_id", id.as_str());

    state
        .notes
        .write(&id, &note)
        .await
        .map_err(|e| AppError::upstream("error writing", e))?;

    tracing::info!(note_id = %id, "Note created");

    let location = HeaderValue::from_str(&format!("/api/note/{}", id))
        .map_err(|e| AppError::upstream("internal error", e))?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(json!({ "id": id })),
    )
        .into_response())
}

/// POST|PUT /api/note/{id} - Create or replace the note under `id`
#[tracing::instrument(name = "http.update_note", skip(state, body))]
pub async fn update_note(state: &AppState, id: &str, body: &Bytes) -> Result<Response> {
    let note = decode_body(body)?;

    match state.notes.write(id, &note).await {
        Ok(()) => {}
        Err(e @ NoteStoreError::InvalidId(_)) => return Err(AppError::bad_request("invalid note id", e)),
        Err(e) => return Err(AppError::upstream("error writing", e)),
    }

    tracing::info!(note_id = %id, "Note saved");
    Ok(Json(json!({ "id": id })).into_response())
}

/// DELETE /api/note/{id}
#[tracing::instrument(name = "http.delete_note", skip(state))]
pub async fn delete_note(state: &AppState, id: &str) -> Result<Response> {
    if !state.notes.exists(id).await {
        return Err(AppError::not_found());
    }

    match state.notes.delete(id).await {
        Ok(()) => {}
        // lost a race with another delete
        Err(NoteStoreError::NotFound(_)) => return Err(AppError::not_found()),
        Err(e) => return Err(AppError::upstream("internal error", e)),
    }

    tracing::info!(note_id = %id, "Note deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}
