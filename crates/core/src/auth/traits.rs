use async_trait::async_trait;
use url::Url;

use super::{AuthError, AuthFlowState, Session, SessionId, TokenSet};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Abstraction over the OIDC identity provider.
#[async_trait]
pub trait OidcProviderClient: Send + Sync {
    /// Generate the authorization URL for the user redirect.
    async fn authorization_url(&self, state: &str, pkce_challenge: &str) -> Result<Url>;

    /// Exchange an authorization code for the provider's token material.
    async fn exchange_code(&self, code: &str, pkce_verifier: &str) -> Result<TokenSet>;
}

/// Session storage abstraction.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new session.
    async fn create_session(&self, session: &Session) -> Result<()>;

    /// Retrieve session by ID.
    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>>;

    /// Delete a specific session.
    async fn delete_session(&self, id: &SessionId) -> Result<()>;

    /// Store PKCE/state for an in-flight login (short TTL).
    async fn store_auth_flow(&self, state: &str, flow: &AuthFlowState) -> Result<()>;

    /// Retrieve and delete auth flow state.
    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlowState>>;
}
