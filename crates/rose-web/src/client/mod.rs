//! Twitter OAuth 1.0a provider client.
//!
//! Provides async HTTP calls to the provider's two token endpoints:
//! - `request_token`: HMAC-SHA1 signed, carries the relay callback URL
//! - `access_token`: exchanges the verifier for user credentials
//!
//! Responses are `application/x-www-form-urlencoded`. Nothing is retried;
//! a failed call surfaces immediately to the relay.

use std::collections::HashMap;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::oauth::Credentials;
use crate::oauth::codes::generate_nonce;
use crate::oauth::signature::{ConsumerCredentials, request_token_header};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Temporary credentials from the request-token step.
#[derive(Debug, Clone)]
pub struct RequestToken {
    pub oauth_token: String,
    pub callback_confirmed: bool,
}

/// Provider API client.
#[derive(Clone)]
pub struct ProviderClient {
    client: Client,
    consumer_key: String,
    consumer_secret: String,
    request_token_url: String,
    authorize_url: String,
    access_token_url: String,
}

impl ProviderClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("rose-web/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
            request_token_url: config.request_token_url.clone(),
            authorize_url: config.authorize_url.clone(),
            access_token_url: config.access_token_url.clone(),
        })
    }

    /// Step 1: obtain a request token bound to `callback`.
    ///
    /// # Errors
    ///
    /// Returns `Rejected`/`MissingToken` if the provider refuses, other
    /// variants on transport or parse failure.
    pub async fn request_token(&self, callback: &str) -> ClientResult<RequestToken> {
        let consumer =
            ConsumerCredentials { key: &self.consumer_key, secret: &self.consumer_secret };
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let auth_header = request_token_header(
            "POST",
            &self.request_token_url,
            &consumer,
            callback,
            &generate_nonce(),
            &timestamp,
        );

        let response = self
            .client
            .post(&self.request_token_url)
            .header(AUTHORIZATION, auth_header)
            .send()
            .await?;

        let mut params = Self::handle_response(response).await?;
        let oauth_token = params.remove("oauth_token").ok_or(ClientError::MissingToken)?;
        let callback_confirmed =
            params.get("oauth_callback_confirmed").is_some_and(|v| v == "true");

        Ok(RequestToken { oauth_token, callback_confirmed })
    }

    /// Step 2: authorization page the user's browser is sent to.
    ///
    /// # Errors
    ///
    /// Returns error if the configured authorize URL is invalid.
    pub fn authorize_url(&self, oauth_token: &str) -> ClientResult<String> {
        let url = url::Url::parse_with_params(&self.authorize_url, &[("oauth_token", oauth_token)])?;
        Ok(url.into())
    }

    /// Step 3: exchange the verifier for access credentials.
    ///
    /// This request is not signed: the provider accepts the verifier alone.
    /// Strict OAuth 1.0a signs this step with the request token secret; this
    /// relay never holds that secret.
    ///
    /// # Errors
    ///
    /// Returns `Rejected`/`MissingToken` if the provider refuses, other
    /// variants on transport or parse failure.
    pub async fn access_token(
        &self,
        oauth_token: &str,
        oauth_verifier: &str,
    ) -> ClientResult<Credentials> {
        let body = serde_urlencoded::to_string([
            ("oauth_token", oauth_token),
            ("oauth_verifier", oauth_verifier),
        ])?;

        let response = self
            .client
            .post(&self.access_token_url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let mut params = Self::handle_response(response).await?;
        let access_token = params.remove("oauth_token").ok_or(ClientError::MissingToken)?;

        Ok(Credentials {
            access_token,
            access_token_secret: params.remove("oauth_token_secret").unwrap_or_default(),
            user_id: params.remove("user_id").unwrap_or_default(),
            screen_name: params.remove("screen_name").unwrap_or_default(),
        })
    }

    /// Check the status and decode the form-encoded body.
    async fn handle_response(response: reqwest::Response) -> ClientResult<HashMap<String, String>> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::rejected(status.as_u16(), body));
        }

        Ok(serde_urlencoded::from_str(&body)?)
    }
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("consumer_key", &self.consumer_key)
            .field("request_token_url", &self.request_token_url)
            .field("authorize_url", &self.authorize_url)
            .field("access_token_url", &self.access_token_url)
            .finish()
    }
}
