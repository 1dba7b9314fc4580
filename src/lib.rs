// Shared infrastructure
pub mod config;
pub mod error;

// Collaborators
pub mod fs;
pub mod notes;
pub mod template;

// Application layer
pub mod api;
pub mod http;
pub mod routing;
pub mod server;
