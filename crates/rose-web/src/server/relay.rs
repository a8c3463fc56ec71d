//! TVii Twitter relay endpoints.
//!
//! Implements the four legs of the code-correlated OAuth 1.0a handshake:
//! - `GET /tvii/generateTWCode`: console asks for a code
//! - `GET /tvii/checkForTWRedirect`: browser is sent to Twitter
//! - `GET /tvii/getAccessTokenTW`: Twitter sends the browser back
//! - `GET /tvii/clientCheckTWCodeVerified`: console collects credentials once

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::router::HttpState;
use crate::error::{RelayError, RelayResult, StoreError};
use crate::oauth::{AssociationStatus, Poll};

/// Message shown in the browser once the account is linked.
const LINKED_MESSAGE: &str = "Your Twitter account is linked. You can return to TVii now.";

const VERIFIER_REJECTED: &str = "Twitter rejected the verifier";

#[derive(Debug, Deserialize)]
pub struct CodeQuery {
    pub code: Option<String>,
}

/// Query string Twitter appends to the callback URL.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub oauth_token: Option<String>,
    pub oauth_verifier: Option<String>,
    /// Present instead of a verifier when the user cancels at Twitter.
    pub denied: Option<String>,
}

/// Body of a poll response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub code: String,
    pub status: AssociationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_secret: Option<String>,
}

fn required<'a>(value: Option<&'a str>, name: &str) -> RelayResult<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RelayError::invalid_code(format!("Missing {name}")))
}

// ─── Initiate ────────────────────────────────────────────────────────────────

/// `GET /tvii/generateTWCode`
///
/// Reserve a code, fetch a request token whose callback carries the code, and
/// store the association. The reservation is released if any step fails; a
/// request dropped mid-flight leaves it to the TTL sweep.
pub async fn handle_generate_code(State(state): State<Arc<HttpState>>) -> RelayResult<Response> {
    let code = state.store.reserve_code().await;

    match initiate(&state, &code).await {
        Ok(()) => {
            tracing::info!(code = %code, "Issued TVii code");
            Ok(Json(serde_json::json!({ "code": code })).into_response())
        }
        Err(e) => {
            state.store.release_code(&code).await;
            tracing::warn!(code = %code, error = %e, "Code initiation failed");
            Err(e)
        }
    }
}

async fn initiate(state: &HttpState, code: &str) -> RelayResult<()> {
    let callback = state
        .config
        .callback_url(code)
        .map_err(|e| RelayError::internal(format!("Invalid callback URL: {e}")))?;

    let request_token = state.provider.request_token(&callback).await.inspect_err(|e| {
        tracing::warn!(code = %code, error = %e, "Request token call failed");
    })?;
    if !request_token.callback_confirmed {
        tracing::warn!(code = %code, "Provider did not confirm the callback URL");
    }

    let oauth_url = state.provider.authorize_url(&request_token.oauth_token)?;
    state.store.create(code, request_token.oauth_token, oauth_url).await?;
    Ok(())
}

// ─── Redirect ────────────────────────────────────────────────────────────────

/// `GET /tvii/checkForTWRedirect?code=...`
///
/// Send the browser to the Twitter authorization page for this code.
pub async fn handle_check_redirect(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<CodeQuery>,
) -> RelayResult<Response> {
    let code = required(query.code.as_deref(), "code")?;

    let association = state.store.get(code).await.inspect_err(|_| {
        tracing::debug!(code = %code, "Redirect requested for unknown code");
    })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, association.oauth_url)]).into_response())
}

// ─── Finalize ────────────────────────────────────────────────────────────────

/// `GET /tvii/getAccessTokenTW?code=...&oauth_token=...&oauth_verifier=...`
///
/// Twitter redirects the browser here after the user approves. The request
/// token must match the one recorded for the code before the verifier is
/// exchanged; on any failure the association stays unverified.
pub async fn handle_access_token(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<CallbackQuery>,
) -> RelayResult<Response> {
    let code = required(query.code.as_deref(), "code")?;

    if query.denied.is_some() {
        tracing::info!(code = %code, "User denied authorization");
        return Err(RelayError::ProviderRejected("Authorization was denied".to_string()));
    }

    let oauth_token = required(query.oauth_token.as_deref(), "oauth_token")?;
    let oauth_verifier = required(query.oauth_verifier.as_deref(), "oauth_verifier")?;

    let association = state.store.get(code).await?;
    if association.oauth_token != oauth_token {
        tracing::warn!(code = %code, "Request token does not match code");
        return Err(StoreError::TokenMismatch(code.to_owned()).into());
    }
    if association.is_verified() {
        return Err(StoreError::AlreadyVerified(code.to_owned()).into());
    }

    let credentials =
        state.provider.access_token(oauth_token, oauth_verifier).await.map_err(|e| {
            tracing::warn!(code = %code, error = %e, "Access token exchange failed");
            RelayError::ProviderRejected(VERIFIER_REJECTED.to_string())
        })?;

    let verified = state.store.verify(code, oauth_token, credentials).await?;
    if let Some(ref credentials) = verified.credentials {
        tracing::info!(code = %code, user_id = %credentials.user_id, "Code verified");
    }

    Ok(Json(serde_json::json!({ "message": LINKED_MESSAGE })).into_response())
}

// ─── Poll ────────────────────────────────────────────────────────────────────

/// `GET /tvii/clientCheckTWCodeVerified?code=...`
///
/// Idempotent while unverified. Once verified, the credentials are returned
/// and the association is removed, so a second poll fails.
pub async fn handle_check_verified(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<CodeQuery>,
) -> RelayResult<Json<PollResponse>> {
    let code = required(query.code.as_deref(), "code")?;

    let response = match state.store.take_if_verified(code).await? {
        Poll::Pending(association) => PollResponse {
            code: association.code,
            status: association.status,
            screen_name: None,
            access_token: None,
            access_token_secret: None,
        },
        Poll::Delivered(association) => {
            tracing::info!(code = %code, "Delivered credentials to TVii client");
            let credentials = association
                .credentials
                .ok_or_else(|| RelayError::internal("Verified association has no credentials"))?;
            PollResponse {
                code: association.code,
                status: association.status,
                screen_name: Some(credentials.screen_name),
                access_token: Some(credentials.access_token),
                access_token_secret: Some(credentials.access_token_secret),
            }
        }
    };

    Ok(Json(response))
}
