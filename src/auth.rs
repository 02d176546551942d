//! Client-credentials exchange against the Workspace token endpoint.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Credentials;
use crate::error::AuthError;

const TOKEN_PATH: &str = "oauth/token";

/// Short-lived bearer token, used for exactly one send.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn bearer(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges the application id/secret for a bearer token. No caching:
/// every call hits the token endpoint.
#[derive(Clone)]
pub struct CredentialExchanger {
    client: Client,
    token_url: String,
    credentials: Credentials,
}

impl CredentialExchanger {
    pub fn new(client: Client, api_url: &str, credentials: Credentials) -> Self {
        Self {
            client,
            token_url: format!("{}/{TOKEN_PATH}", api_url.trim_end_matches('/')),
            credentials,
        }
    }

    pub async fn authenticate(&self) -> Result<AccessToken, AuthError> {
        debug!(url = %self.token_url, "requesting access token");

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(AuthError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "token endpoint rejected application credentials");
            return Err(AuthError::Rejected { status, body });
        }

        let body = response.bytes().await.map_err(AuthError::Transport)?;
        let token: TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        if token.access_token.is_empty() {
            return Err(AuthError::MalformedResponse("empty access_token".into()));
        }
        Ok(AccessToken(token.access_token))
    }
}
