use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::routing::dispatch;

use super::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Every path goes through the dispatcher
        .fallback(dispatch)
        // Note bodies are unbounded
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
