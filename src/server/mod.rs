mod app;
mod state;

pub use app::create_app;
pub use state::{AppState, INCLUDES_DIR, STATIC_DIR, VIEWS_DIR};
