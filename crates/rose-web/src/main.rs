//! Project Rosé website - Entry Point
//!
//! Serves the static site and the TVii Twitter relay over HTTP.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use rose_web::{config::Config, server::RoseServer};

#[derive(Parser, Debug)]
#[command(name = "rose-web")]
#[command(about = "Project Rosé website and TVii Twitter relay")]
#[command(version)]
struct Cli {
    /// Path to config.json (http.port, twitter.consumer_key, twitter.consumer_secret)
    #[arg(long, env = "ROSE_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP server port
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Twitter consumer key
    #[arg(long, env = "TWITTER_CONSUMER_KEY")]
    consumer_key: Option<String>,

    /// Twitter consumer secret
    #[arg(long, env = "TWITTER_CONSUMER_SECRET", hide_env_values = true)]
    consumer_secret: Option<String>,

    /// Public base URL used in the OAuth callback (e.g., https://rose.example.com)
    #[arg(long, env = "BASE_URL")]
    base_url: Option<String>,

    /// Static assets directory
    #[arg(long, env = "ROSE_PUBLIC_DIR")]
    public_dir: Option<PathBuf>,

    /// HTML views directory
    #[arg(long, env = "ROSE_VIEWS_DIR")]
    views_dir: Option<PathBuf>,

    /// Seconds before an unfinished handshake is discarded
    #[arg(long, env = "ROSE_ASSOCIATION_TTL")]
    association_ttl_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Load the config file (if any) and apply command-line overrides.
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match self.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(port) = self.port {
            config.http_port = port;
        }
        if let Some(key) = self.consumer_key {
            config.consumer_key = key;
        }
        if let Some(secret) = self.consumer_secret {
            config.consumer_secret = secret;
        }
        if let Some(base_url) = self.base_url {
            config.public_base_url = base_url;
        }
        if let Some(dir) = self.public_dir {
            config.public_dir = dir;
        }
        if let Some(dir) = self.views_dir {
            config.views_dir = dir;
        }
        if let Some(secs) = self.association_ttl_secs {
            config.association_ttl = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Project Rosé website");

    let config = cli.into_config()?;
    tracing::info!(
        port = config.http_port,
        base_url = %config.public_base_url,
        "Loaded configuration"
    );

    let server = RoseServer::new(config)?;
    server.run_http().await
}
