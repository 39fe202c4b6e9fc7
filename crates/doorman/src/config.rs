//! Environment configuration.

use std::time::Duration;

use url::Url;

use crate::error::AppError;

/// OAuth client registration plus server settings, loaded once at startup
/// and immutable afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Auth0 tenant domain, e.g. `dev-abc123.us.auth0.com`.
    pub domain: String,
    /// Key material for signing the session cookie.
    pub secret_key: String,
    pub base_url: Url,
    pub session_ttl: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl AppConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `APP_SECRET_KEY`: cookie signing key, at least 32 bytes (required)
    /// - `AUTH0_CLIENT_ID`: OAuth client ID (required)
    /// - `AUTH0_CLIENT_SECRET`: OAuth client secret (required)
    /// - `AUTH0_DOMAIN`: Auth0 tenant domain (required)
    /// - `BASE_URL`: public base URL for callback and logout redirects
    ///   (default: `http://localhost:3000`)
    /// - `SESSION_TTL_DAYS`: session TTL in days (default: 7)
    /// - `COOKIE_SECURE`: whether to set the secure flag on cookies (default: true)
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable that is missing or malformed.
    pub fn from_env() -> Result<Self, AppError> {
        let base_url: Url = std::env::var("BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("BASE_URL is not a valid URL: {e}")))?;

        let secret_key = require("APP_SECRET_KEY")?;
        if secret_key.len() < 32 {
            return Err(AppError::Config(
                "APP_SECRET_KEY must be at least 32 bytes".to_string(),
            ));
        }

        let session_ttl = std::env::var("SESSION_TTL_DAYS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(|days| Duration::from_secs(days * 24 * 60 * 60))
            .unwrap_or(Duration::from_secs(7 * 24 * 60 * 60)); // 7 days default

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        Ok(Self {
            client_id: require("AUTH0_CLIENT_ID")?,
            client_secret: require("AUTH0_CLIENT_SECRET")?,
            domain: require("AUTH0_DOMAIN")?,
            secret_key,
            base_url,
            session_ttl,
            cookie_name: "session".to_string(),
            cookie_secure,
        })
    }

    /// Callback URL registered with the provider.
    pub fn redirect_uri(&self) -> Url {
        self.base_url.join("/callback").unwrap()
    }

    /// OIDC issuer for discovery.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }
}

fn require(name: &str) -> Result<String, AppError> {
    std::env::var(name).map_err(|_| AppError::Config(format!("{name} is not set")))
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        client_id: "client-123".to_string(),
        client_secret: "shhh".to_string(),
        domain: "demo.auth0.com".to_string(),
        secret_key: "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"
            .to_string(),
        base_url: Url::parse("http://localhost:3000").unwrap(),
        session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        cookie_name: "session".to_string(),
        cookie_secure: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_uri_joins_callback_onto_base_url() {
        let config = test_config();
        assert_eq!(
            config.redirect_uri().as_str(),
            "http://localhost:3000/callback"
        );
    }

    #[test]
    fn issuer_is_https_tenant_root() {
        let config = test_config();
        assert_eq!(config.issuer(), "https://demo.auth0.com/");
    }
}
