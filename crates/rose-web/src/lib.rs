//! Project Rosé website
//!
//! Serves the static Rosé site and relays a three-legged Twitter OAuth 1.0a
//! handshake for TVii clients.
//!
//! # Features
//!
//! - **Static site**: `public/` assets, `views/index.html`, 404 fallback page
//! - **OAuth relay**: six-digit codes correlate a TVii console with the
//!   browser that completes the Twitter authorization
//! - **One-shot delivery**: verified credentials are handed out exactly once
//! - **Bounded state**: abandoned handshakes expire after a TTL
//!
//! # Example
//!
//! ```no_run
//! use rose_web::{config::Config, server::RoseServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_file("config.json")?;
//!     let server = RoseServer::new(config)?;
//!
//!     server.run_http().await
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod oauth;
pub mod server;

pub use client::ProviderClient;
pub use config::Config;
pub use error::{ClientError, RelayError, StoreError};
