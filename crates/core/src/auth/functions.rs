use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};
use url::Url;

use super::{AuthError, Result, Session, SessionId};

/// Generate a cryptographically random session ID.
pub fn generate_session_id() -> SessionId {
    let id: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    SessionId::new(id)
}

/// Generate a random state parameter for CSRF protection.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Check if a session has expired.
pub fn is_session_expired(session: &Session, now: DateTime<Utc>) -> bool {
    session.expires_at <= now
}

/// Calculate session expiry from creation time and TTL.
pub fn calculate_expiry(created_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    created_at + ttl
}

/// Build the provider's RP-initiated logout URL.
///
/// The browser is sent here after the local session is cleared; `return_to`
/// is where the provider redirects once its own session is gone. Both query
/// parameters are URL-encoded.
pub fn logout_url(domain: &str, client_id: &str, return_to: &str) -> Result<Url> {
    let mut url = Url::parse(&format!("https://{domain}/v2/logout"))
        .map_err(|e| AuthError::Provider(e.to_string()))?;

    url.query_pairs_mut()
        .append_pair("returnTo", return_to)
        .append_pair("client_id", client_id);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenSet, UserInfo};

    fn test_session(expires_at: DateTime<Utc>) -> Session {
        let now = Utc::now();
        Session {
            id: generate_session_id(),
            token: TokenSet {
                access_token: "at".to_string(),
                id_token: "it".to_string(),
                expires_in: None,
                scope: None,
                userinfo: UserInfo {
                    sub: "auth0|123".to_string(),
                    email: Some("a@b.com".to_string()),
                    name: None,
                    picture: None,
                    extra: Default::default(),
                },
            },
            created_at: now,
            expires_at,
        }
    }

    #[test]
    fn generate_session_id_produces_32_char_alphanumeric() {
        let id = generate_session_id();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generate_session_id_is_unique() {
        let id1 = generate_session_id();
        let id2 = generate_session_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn generate_state_produces_32_char_string() {
        let state = generate_state();
        assert_eq!(state.len(), 32);
    }

    #[test]
    fn is_session_expired_returns_false_for_future_expiry() {
        let session = test_session(Utc::now() + Duration::hours(1));
        assert!(!is_session_expired(&session, Utc::now()));
    }

    #[test]
    fn is_session_expired_returns_true_for_past_expiry() {
        let session = test_session(Utc::now() - Duration::hours(1));
        assert!(is_session_expired(&session, Utc::now()));
    }

    #[test]
    fn is_session_expired_returns_true_at_exact_expiry() {
        let now = Utc::now();
        let session = test_session(now);
        assert!(is_session_expired(&session, now));
    }

    #[test]
    fn calculate_expiry_adds_ttl_to_created_at() {
        let created = Utc::now();
        let ttl = Duration::days(7);
        assert_eq!(calculate_expiry(created, ttl), created + ttl);
    }

    #[test]
    fn logout_url_points_at_tenant_logout_endpoint() {
        let url = logout_url("demo.auth0.com", "client-123", "http://localhost:3000/").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("demo.auth0.com"));
        assert_eq!(url.path(), "/v2/logout");
    }

    #[test]
    fn logout_url_encodes_query_parameters() {
        let url = logout_url("demo.auth0.com", "client-123", "http://localhost:3000/").unwrap();
        let query = url.query().unwrap();
        assert!(query.contains("returnTo=http%3A%2F%2Flocalhost%3A3000%2F"));
        assert!(query.contains("client_id=client-123"));
    }
}
