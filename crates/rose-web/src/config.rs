//! Configuration for the Rosé web server.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Provider and server constants.
pub mod api {
    use std::time::Duration;

    /// Twitter request-token endpoint.
    pub const REQUEST_TOKEN_URL: &str = "https://api.twitter.com/oauth/request_token";

    /// Twitter user authorization page.
    pub const AUTHORIZE_URL: &str = "https://api.twitter.com/oauth/authorize";

    /// Twitter access-token endpoint.
    pub const ACCESS_TOKEN_URL: &str = "https://api.twitter.com/oauth/access_token";

    /// Default HTTP port.
    pub const HTTP_PORT: u16 = 8080;

    /// Default public base URL, used to build the OAuth callback.
    pub const PUBLIC_BASE_URL: &str = "http://localhost:8080";

    /// Request timeout for provider calls.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout for provider calls.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Lifetime of an association before the sweeper drops it (15 minutes).
    pub const ASSOCIATION_TTL: Duration = Duration::from_secs(15 * 60);

    /// Sweep interval for expired associations.
    pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

    /// Static assets directory.
    pub const PUBLIC_DIR: &str = "public";

    /// HTML views directory (index and error pages).
    pub const VIEWS_DIR: &str = "views";
}

/// Relay paths, shared by the router and the callback URL builder.
pub mod routes {
    pub const GENERATE_CODE: &str = "/tvii/generateTWCode";
    pub const CHECK_REDIRECT: &str = "/tvii/checkForTWRedirect";
    pub const ACCESS_TOKEN: &str = "/tvii/getAccessTokenTW";
    pub const CHECK_VERIFIED: &str = "/tvii/clientCheckTWCodeVerified";
}

/// Server configuration.
#[derive(Clone)]
pub struct Config {
    /// Port the HTTP server binds on `0.0.0.0`.
    pub http_port: u16,

    /// Externally reachable base URL of this server.
    pub public_base_url: String,

    /// Twitter consumer key.
    pub consumer_key: String,

    /// Twitter consumer secret.
    pub consumer_secret: String,

    /// Request-token endpoint (overridable for mock servers).
    pub request_token_url: String,

    /// Authorization page users are redirected to.
    pub authorize_url: String,

    /// Access-token endpoint (overridable for mock servers).
    pub access_token_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Association lifetime.
    pub association_ttl: Duration,

    /// Expiry sweep interval.
    pub cleanup_interval: Duration,

    /// Static assets directory.
    pub public_dir: PathBuf,

    /// HTML views directory.
    pub views_dir: PathBuf,
}

/// On-disk layout of `config.json`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    http: HttpSection,
    #[serde(default)]
    twitter: TwitterSection,
    public_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct HttpSection {
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct TwitterSection {
    consumer_key: Option<String>,
    consumer_secret: Option<String>,
}

impl Config {
    /// Create a configuration for the given consumer credentials.
    #[must_use]
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            http_port: api::HTTP_PORT,
            public_base_url: api::PUBLIC_BASE_URL.to_string(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            request_token_url: api::REQUEST_TOKEN_URL.to_string(),
            authorize_url: api::AUTHORIZE_URL.to_string(),
            access_token_url: api::ACCESS_TOKEN_URL.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            association_ttl: api::ASSOCIATION_TTL,
            cleanup_interval: api::CLEANUP_INTERVAL,
            public_dir: PathBuf::from(api::PUBLIC_DIR),
            views_dir: PathBuf::from(api::VIEWS_DIR),
        }
    }

    /// Create a test configuration pointing every provider endpoint at a mock server.
    #[must_use]
    pub fn for_testing(provider_url: &str) -> Self {
        Self {
            http_port: 0,
            public_base_url: "https://rose.example.com".to_string(),
            consumer_key: "test-consumer-key".to_string(),
            consumer_secret: "test-consumer-secret".to_string(),
            request_token_url: format!("{}/oauth/request_token", provider_url),
            authorize_url: format!("{}/oauth/authorize", provider_url),
            access_token_url: format!("{}/oauth/access_token", provider_url),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            association_ttl: api::ASSOCIATION_TTL,
            cleanup_interval: api::CLEANUP_INTERVAL,
            public_dir: PathBuf::from(api::PUBLIC_DIR),
            views_dir: PathBuf::from(api::VIEWS_DIR),
        }
    }

    /// Load configuration from a `config.json` file.
    ///
    /// Missing sections fall back to defaults; consumer credentials may be
    /// supplied later (see [`Config::validate`]).
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not valid JSON.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        Self::from_json(&raw)
    }

    /// Parse configuration from the `config.json` layout.
    ///
    /// # Errors
    ///
    /// Returns error if the input is not valid JSON.
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let file: ConfigFile = serde_json::from_str(raw)?;

        let mut config = Self::new(
            file.twitter.consumer_key.unwrap_or_default(),
            file.twitter.consumer_secret.unwrap_or_default(),
        );
        if let Some(port) = file.http.port {
            config.http_port = port;
        }
        if let Some(base_url) = file.public_base_url {
            config.public_base_url = base_url;
        }
        Ok(config)
    }

    /// Check that the configuration can drive the relay.
    ///
    /// # Errors
    ///
    /// Returns error if consumer credentials are missing or the base URL is invalid.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.consumer_key.is_empty() {
            anyhow::bail!("Twitter consumer key is not configured");
        }
        if self.consumer_secret.is_empty() {
            anyhow::bail!("Twitter consumer secret is not configured");
        }
        url::Url::parse(&self.public_base_url)
            .map_err(|e| anyhow::anyhow!("invalid public base URL {}: {e}", self.public_base_url))?;
        Ok(())
    }

    /// Callback URL the provider redirects the browser to for a given code.
    ///
    /// # Errors
    ///
    /// Returns error if the public base URL is not a valid URL.
    pub fn callback_url(&self, code: &str) -> Result<String, url::ParseError> {
        let base = format!("{}{}", self.public_base_url.trim_end_matches('/'), routes::ACCESS_TOKEN);
        let url = url::Url::parse_with_params(&base, &[("code", code)])?;
        Ok(url.into())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(String::new(), String::new())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("http_port", &self.http_port)
            .field("public_base_url", &self.public_base_url)
            .field("consumer_key", &self.consumer_key)
            .field("has_consumer_secret", &!self.consumer_secret.is_empty())
            .field("request_token_url", &self.request_token_url)
            .field("authorize_url", &self.authorize_url)
            .field("access_token_url", &self.access_token_url)
            .field("association_ttl", &self.association_ttl)
            .field("public_dir", &self.public_dir)
            .field("views_dir", &self.views_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.http_port, api::HTTP_PORT);
        assert_eq!(config.request_token_url, api::REQUEST_TOKEN_URL);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_reads_original_layout() {
        let config = Config::from_json(
            r#"{
                "http": { "port": 3000 },
                "twitter": { "consumer_key": "ck", "consumer_secret": "cs" },
                "public_base_url": "https://rose.example.com"
            }"#,
        )
        .unwrap();

        assert_eq!(config.http_port, 3000);
        assert_eq!(config.consumer_key, "ck");
        assert_eq!(config.consumer_secret, "cs");
        assert_eq!(config.public_base_url, "https://rose.example.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_port_only() {
        let config = Config::from_json(r#"{ "http": { "port": 80 } }"#).unwrap();
        assert_eq!(config.http_port, 80);
        assert!(config.consumer_key.is_empty());
    }

    #[test]
    fn test_callback_url_embeds_code() {
        let mut config = Config::new("ck", "cs");
        config.public_base_url = "https://rose.example.com/".to_string();

        let url = config.callback_url("482913").unwrap();
        assert_eq!(url, "https://rose.example.com/tvii/getAccessTokenTW?code=482913");
    }

    #[test]
    fn test_debug_hides_consumer_secret() {
        let config = Config::new("ck", "very-secret-value");
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret-value"));
        assert!(debug.contains("has_consumer_secret"));
    }
}
