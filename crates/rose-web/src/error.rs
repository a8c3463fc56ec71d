//! Error types for the Rosé relay.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! [`RelayError`] is the operation boundary: every relay handler converts
//! whatever went wrong into one of its variants, which renders as a JSON
//! `{"error": ...}` body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors from calls to the OAuth provider.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provider URL could not be built
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Form-encoded request body could not be built
    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),

    /// Form-encoded response body could not be parsed
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_urlencoded::de::Error),

    /// Provider answered with a non-success status
    #[error("Provider rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Provider answered without an `oauth_token`
    #[error("Provider response did not include an oauth_token")]
    MissingToken,
}

impl ClientError {
    /// Create a rejection error.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected { status, message: message.into() }
    }

    /// Returns true if the provider itself refused the request.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::MissingToken)
    }
}

/// Errors from the association store.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An association already exists under this code
    #[error("Duplicate code: {0}")]
    DuplicateCode(String),

    /// No association under this code
    #[error("Unknown code: {0}")]
    NotFound(String),

    /// The presented request token differs from the one recorded at initiation
    #[error("Request token does not match code {0}")]
    TokenMismatch(String),

    /// The association was already verified
    #[error("Code {0} is already verified")]
    AlreadyVerified(String),
}

/// Errors surfaced by the relay endpoints.
#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    /// Code missing, expired, unknown, or paired with the wrong token
    #[error("{0}")]
    InvalidCode(String),

    /// Provider returned no usable token
    #[error("{0}")]
    ProviderRejected(String),

    /// Transport failure, parse failure, or unexpected state
    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    /// Create an invalid code error.
    #[must_use]
    pub fn invalid_code(message: impl Into<String>) -> Self {
        Self::InvalidCode(message.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCode(_) | Self::ProviderRejected(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for RelayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateCode(_) => Self::Internal(err.to_string()),
            StoreError::NotFound(_) | StoreError::TokenMismatch(_) | StoreError::AlreadyVerified(_) => {
                Self::InvalidCode("Invalid code".to_string())
            }
        }
    }
}

/// Provider detail stays in the logs; callers only see a fixed message.
impl From<ClientError> for RelayError {
    fn from(err: ClientError) -> Self {
        if err.is_rejection() {
            Self::ProviderRejected("Twitter rejected the request".to_string())
        } else {
            Self::Internal("Could not complete the request to Twitter".to_string())
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type alias for provider calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_rejection() {
        assert!(ClientError::rejected(401, "bad signature").is_rejection());
        assert!(ClientError::MissingToken.is_rejection());
        assert!(!ClientError::Url(url::ParseError::EmptyHost).is_rejection());
    }

    #[test]
    fn test_relay_error_status() {
        assert_eq!(RelayError::invalid_code("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::ProviderRejected("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::internal("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_store_errors_hide_which_check_failed() {
        let not_found = RelayError::from(StoreError::NotFound("123456".into()));
        let mismatch = RelayError::from(StoreError::TokenMismatch("123456".into()));
        assert_eq!(not_found.to_string(), mismatch.to_string());
        assert_eq!(mismatch.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_duplicate_code_is_internal() {
        let err = RelayError::from(StoreError::DuplicateCode("123456".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_error_conversion() {
        let err = RelayError::from(ClientError::MissingToken);
        assert!(matches!(err, RelayError::ProviderRejected(_)));

        let err = RelayError::from(ClientError::Url(url::ParseError::RelativeUrlWithoutBase));
        assert!(matches!(err, RelayError::Internal(_)));
    }

    #[test]
    fn test_client_error_conversion_hides_provider_body() {
        let err = RelayError::from(ClientError::rejected(401, "secret provider diagnostics"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(!err.to_string().contains("secret provider diagnostics"));
        assert!(!err.to_string().contains("401"));
    }
}
