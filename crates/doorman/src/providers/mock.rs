//! Mock OIDC provider for tests and tenant-less local development.

use async_trait::async_trait;
use base64::Engine;
use doorman_core::auth::{AuthError, OidcProviderClient, Result, TokenSet, UserInfo};
use url::Url;

/// Stand-in for Auth0 that never leaves the process.
///
/// Authorization URLs carry the same query parameters as the real
/// `/authorize` endpoint. The "authorization code" is URL-safe
/// base64-encoded JSON claims, which `exchange_code` decodes straight into
/// the token's userinfo.
pub struct MockProvider {
    authorize_endpoint: Url,
    client_id: String,
    redirect_uri: Url,
}

impl MockProvider {
    pub fn new(authorize_endpoint: Url, client_id: String, redirect_uri: Url) -> Self {
        Self {
            authorize_endpoint,
            client_id,
            redirect_uri,
        }
    }
}

#[async_trait]
impl OidcProviderClient for MockProvider {
    async fn authorization_url(&self, state: &str, pkce_challenge: &str) -> Result<Url> {
        let mut url = self.authorize_endpoint.clone();

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("scope", "openid profile email")
            .append_pair("state", state)
            .append_pair("code_challenge", pkce_challenge)
            .append_pair("code_challenge_method", "S256");

        Ok(url)
    }

    async fn exchange_code(&self, code: &str, _pkce_verifier: &str) -> Result<TokenSet> {
        // Decode the mock code (it contains the claims)
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(code)
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        let userinfo: UserInfo =
            serde_json::from_slice(&decoded).map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        Ok(TokenSet {
            access_token: "mock-access-token".to_string(),
            id_token: "mock-id-token".to_string(),
            expires_in: Some(86_400),
            scope: Some("openid profile email".to_string()),
            userinfo,
        })
    }
}
