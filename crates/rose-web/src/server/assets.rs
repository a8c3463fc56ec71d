//! Static site serving.
//!
//! `/` serves `views/index.html`; every other non-API path is looked up in
//! `public/`, falling through to `views/errors/404.html` with a 404 status.

use std::sync::Arc;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use super::router::HttpState;
use crate::config::Config;

/// Create router for the static site.
pub(crate) fn static_router(config: &Config) -> Router<Arc<HttpState>> {
    let index = ServeFile::new(config.views_dir.join("index.html"));
    let not_found = ServeFile::new(config.views_dir.join("errors").join("404.html"));

    Router::new()
        .route_service("/", index)
        .fallback_service(ServeDir::new(&config.public_dir).not_found_service(not_found))
}
