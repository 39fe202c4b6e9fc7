//! Application state shared by all handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use doorman_core::auth::{OidcProviderClient, SessionRepository};

use crate::config::AppConfig;

/// Shared state: the immutable OAuth registration, the provider client, and
/// the session store. Cloned per handler; everything mutable sits behind the
/// session store's own synchronization.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionRepository>,
    pub provider: Arc<dyn OidcProviderClient>,
    pub config: AppConfig,
    key: Key,
}

impl AppState {
    /// Creates the state, deriving the cookie signing key from the
    /// configured secret. `AppConfig::from_env` guarantees at least 32 bytes
    /// of key material.
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        provider: Arc<dyn OidcProviderClient>,
        config: AppConfig,
    ) -> Self {
        let key = Key::derive_from(config.secret_key.as_bytes());
        Self {
            sessions,
            provider,
            config,
            key,
        }
    }
}

/// Lets `SignedCookieJar` find the signing key.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}
