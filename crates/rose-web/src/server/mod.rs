//! Rosé HTTP server.
//!
//! Serves the static site and the TVii relay from one axum router. The
//! association store is created here, handed to every handler through the
//! router state, and swept in the background for abandoned handshakes.

mod assets;
pub mod relay;
pub mod router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;
use router::HttpState;

/// Rosé web server.
#[derive(Debug)]
pub struct RoseServer {
    state: Arc<HttpState>,
}

impl RoseServer {
    /// Create a new server.
    ///
    /// # Errors
    ///
    /// Returns error if the provider client cannot be built.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Ok(Self { state: Arc::new(HttpState::new(config)?) })
    }

    /// Shared handler state.
    #[must_use]
    pub const fn state(&self) -> &Arc<HttpState> {
        &self.state
    }

    /// Run the HTTP server until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns error on bind or server failure.
    pub async fn run_http(self) -> anyhow::Result<()> {
        let config = &self.state.config;
        let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));

        self.state.store.start_cleanup_task(config.association_ttl, config.cleanup_interval);

        let router = router::create_router(Arc::clone(&self.state));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("The Project Rosé website is running on http://{}", listener.local_addr()?);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
