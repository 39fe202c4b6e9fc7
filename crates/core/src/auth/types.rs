use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cryptographically random session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity claims extracted from the provider's ID token.
///
/// `sub` is always present; the rest depends on the scopes the provider
/// granted. Claims this struct doesn't name end up in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    /// Provider's unique user identifier.
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Token material returned by the authorization-code exchange.
///
/// Stored in the session verbatim and surfaced on the pages as-is; nothing
/// here is re-validated after the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    /// Raw ID token (compact JWT) as issued by the provider.
    pub id_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub userinfo: UserInfo,
}

/// Authenticated browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub token: TokenSet,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// PKCE and return-target data stored between `/login` and `/callback`,
/// keyed by the CSRF state parameter. Consumed exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthFlowState {
    pub pkce_verifier: String,
    pub created_at: DateTime<Utc>,
    /// URL to redirect to after successful authentication.
    pub return_to: Option<String>,
}
