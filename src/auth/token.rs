//! Client-credentials sign-in
//!
//! One POST to the identity endpoint per run. There is no refresh: a run that
//! outlives the token fails on its next request like any other rejected call.

use crate::config::Credential;
use crate::AuthError;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;

/// Opaque bearer token, valid for an unmodelled period
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchanges client credentials for a bearer token
pub struct TokenProvider {
    client: Client,
    token_url: String,
}

impl TokenProvider {
    /// Creates a provider that signs in against `token_url`
    pub fn new(client: Client, token_url: impl Into<String>) -> Self {
        Self {
            client,
            token_url: token_url.into(),
        }
    }

    /// Performs the client-credentials grant
    ///
    /// # Returns
    ///
    /// * `Ok(AccessToken)` - The identity endpoint issued a token
    /// * `Err(AuthError)` - Non-success status, transport failure, or a body
    ///   without an `access_token` field. No retry is attempted.
    pub async fn sign_in(&self, credential: &Credential) -> Result<AccessToken, AuthError> {
        tracing::debug!(
            url = %self.token_url,
            client_id = %credential.client_id,
            "Requesting access token"
        );

        let response = self
            .client
            .post(&self.token_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", credential.client_id.as_str()),
                ("client_secret", credential.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;

        match parsed.access_token {
            Some(token) if !token.is_empty() => {
                tracing::info!(expires_in = ?parsed.expires_in, "Signed in");
                Ok(AccessToken::new(token))
            }
            _ => Err(AuthError::MissingToken),
        }
    }
}
