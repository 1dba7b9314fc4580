use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Uri},
    response::{IntoResponse, Response},
};

use crate::api::route_api;
use crate::error::{AppError, Result};
use crate::fs::OpenedFile;
use crate::http::serve_static;
use crate::server::AppState;
use crate::template::{compose, RenderContext, ROOT_TEMPLATE};

use super::decision::{resolve, RouteDecision};

const HTML_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// Catch-all handler: every request the router sees ends up here.
#[tracing::instrument(
    name = "http.dispatch",
    skip_all,
    fields(method = %method, path = %uri.path(), route = tracing::field::Empty)
)]
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let decision = resolve(&state, uri.path()).await;
    tracing::Span::current().record("route", decision.name());

    match decision {
        RouteDecision::ShortlinkRewrite { note_id, view } => {
            render_view(&state, view, RenderContext::for_note(note_id))
                .await
                .into_response()
        }
        RouteDecision::ApiCall { path } => route_api(&state, &method, &path, body).await,
        RouteDecision::ViewTemplate { view, .. } => {
            render_view(&state, view, RenderContext::default())
                .await
                .into_response()
        }
        RouteDecision::StaticAsset { path, file } => serve_static(&method, &headers, &path, file).await,
        RouteDecision::NotFound => AppError::not_found().into_response(),
    }
}

/// Compose the view with its includes and execute it. Output is buffered,
/// so a failure never leaves a partial page behind.
async fn render_view(state: &AppState, view: OpenedFile, ctx: RenderContext) -> Result<Response> {
    let source = view
        .read_to_string()
        .await
        .map_err(|e| AppError::upstream("internal error", e))?;

    let registry = compose(&source, state.includes.as_ref())
        .await
        .map_err(|e| AppError::template_resolution(e))?;

    let html = registry
        .execute(ROOT_TEMPLATE, &ctx)
        .map_err(|e| AppError::template_execution(e))?;

    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE))],
        html,
    )
        .into_response())
}
