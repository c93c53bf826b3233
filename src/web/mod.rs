//! Web server module.
//!
//! Serves the JSON REST API under `/api/todos`, the htmx page at `/`, and
//! static assets from the configured directory.

mod server;
pub mod templates;

pub use server::{AppState, ServerHandle, build_router, start_server};
