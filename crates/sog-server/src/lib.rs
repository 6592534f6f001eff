//! SOG summarizer HTTP server (Axum).
//!
//! Serves the upload form and the extract, summarize and download endpoints
//! behind it.

pub mod error;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use sog_core::SogConfig;
use state::AppState;

/// Build the application router from a config.
pub fn app(config: SogConfig) -> Router {
    app_with_state(AppState::new(config))
}

/// Build the application router with a custom state.
pub fn app_with_state(state: AppState) -> Router {
    let limit = state.config.server.max_upload_bytes;
    Router::new()
        .merge(routes::page_routes())
        .merge(routes::health_routes())
        .merge(routes::document_routes())
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

#[cfg(test)]
mod tests;
