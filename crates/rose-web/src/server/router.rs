//! HTTP router and shared handler state.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{assets, relay};
use crate::client::ProviderClient;
use crate::config::{Config, routes};
use crate::oauth::AssociationStore;

/// Shared state for HTTP handlers.
pub struct HttpState {
    pub config: Config,
    pub store: AssociationStore,
    pub provider: ProviderClient,
}

impl HttpState {
    /// Build handler state with an empty association store.
    ///
    /// # Errors
    ///
    /// Returns error if the provider client cannot be built.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let provider = ProviderClient::new(&config)?;
        Ok(Self { config, store: AssociationStore::new(), provider })
    }
}

impl std::fmt::Debug for HttpState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpState").field("provider", &self.provider).finish()
    }
}

/// Create the HTTP router for the site and the TVii relay.
pub fn create_router(state: Arc<HttpState>) -> Router {
    let site = assets::static_router(&state.config);

    Router::new()
        .route("/health", get(health_check))
        .route(routes::GENERATE_CODE, get(relay::handle_generate_code))
        .route(routes::CHECK_REDIRECT, get(relay::handle_check_redirect))
        .route(routes::ACCESS_TOKEN, get(relay::handle_access_token))
        .route(routes::CHECK_VERIFIED, get(relay::handle_check_verified))
        .merge(site)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "rose-web",
        "version": env!("CARGO_PKG_VERSION"),
        "associations": state.store.len().await
    }))
}
