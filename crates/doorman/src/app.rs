//! Application router.

use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{
        auth::{callback, callback_form, login, logout},
        pages::{home, protected},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login))
        .route("/callback", get(callback).post(callback_form))
        .route("/logout", get(logout))
        .route("/protected", get(protected))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use base64::Engine;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use url::Url;

    use crate::{config, providers::MockProvider, sessions::SessionStore};

    use super::*;

    fn test_app() -> Router {
        let config = config::test_config();
        let provider = MockProvider::new(
            Url::parse("https://demo.auth0.com/authorize").unwrap(),
            config.client_id.clone(),
            config.redirect_uri(),
        );
        let state = AppState::new(
            Arc::new(SessionStore::new()),
            Arc::new(provider),
            config,
        );
        create_app(state)
    }

    fn mock_code(sub: &str, email: &str) -> String {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "sub": sub,
                "email": email,
                "name": "Test User",
            })
            .to_string(),
        )
    }

    async fn get(app: &Router, uri: &str) -> axum::response::Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> axum::response::Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    fn location(response: &axum::response::Response) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .expect("location header")
            .to_str()
            .unwrap()
            .to_string()
    }

    /// Walk the full flow: /login for a state, /callback with a mock code.
    /// Returns the session cookie (`name=value`) and the consumed state.
    async fn sign_in(app: &Router, sub: &str, email: &str) -> (String, String) {
        let response = get(app, "/login").await;
        assert!(response.status().is_redirection());

        let auth_url = Url::parse(&location(&response)).unwrap();
        let state = auth_url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.to_string())
            .expect("state parameter in authorization URL");

        let uri = format!("/callback?code={}&state={}", mock_code(sub, email), state);
        let response = get(app, &uri).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/");

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("set-cookie header")
            .to_str()
            .unwrap();
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        (cookie, state)
    }

    #[tokio::test]
    async fn home_renders_sign_in_link_without_session() {
        let app = test_app();

        let response = get(&app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("You are not signed in"));
        assert!(html.contains("/login"));
    }

    #[tokio::test]
    async fn login_redirects_to_authorization_url() {
        let app = test_app();

        let response = get(&app, "/login").await;
        assert!(response.status().is_redirection());

        let target = location(&response);
        assert!(target.starts_with("https://demo.auth0.com/authorize"));
        assert!(target.contains("client_id=client-123"));
        assert!(target.contains("%2Fcallback"));
        assert!(target.contains("state="));
    }

    #[tokio::test]
    async fn protected_without_session_redirects_to_login() {
        let app = test_app();

        let response = get(&app, "/protected").await;
        assert!(response.status().is_redirection());
        assert!(location(&response).starts_with("/login"));
    }

    #[tokio::test]
    async fn callback_with_unknown_state_is_rejected() {
        let app = test_app();

        let uri = format!("/callback?code={}&state=bogus", mock_code("auth0|1", "x@y.z"));
        let response = get(&app, &uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn callback_state_is_single_use() {
        let app = test_app();
        let (_, state) = sign_in(&app, "auth0|123", "a@b.com").await;

        let uri = format!(
            "/callback?code={}&state={}",
            mock_code("auth0|123", "a@b.com"),
            state
        );
        let response = get(&app, &uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn callback_missing_parameters_is_rejected() {
        let app = test_app();

        let response = get(&app, "/callback?code=only-a-code").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn protected_with_session_shows_claims() {
        let app = test_app();
        let (cookie, _) = sign_in(&app, "auth0|123", "a@b.com").await;

        let response = get_with_cookie(&app, "/protected", &cookie).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("auth0|123"));
        assert!(html.contains("a@b.com"));
    }

    #[tokio::test]
    async fn home_with_session_shows_token_json() {
        let app = test_app();
        let (cookie, _) = sign_in(&app, "auth0|123", "a@b.com").await;

        let response = get_with_cookie(&app, "/", &cookie).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("Test User"));
        assert!(html.contains("mock-access-token"));
        assert!(html.contains("/logout"));
    }

    #[tokio::test]
    async fn tampered_cookie_is_ignored() {
        let app = test_app();
        sign_in(&app, "auth0|123", "a@b.com").await;

        let response = get_with_cookie(&app, "/protected", "session=forged-value").await;
        assert!(response.status().is_redirection());
        assert!(location(&response).starts_with("/login"));
    }

    #[tokio::test]
    async fn logout_redirects_to_provider_and_kills_session() {
        let app = test_app();
        let (cookie, _) = sign_in(&app, "auth0|123", "a@b.com").await;

        let response = get_with_cookie(&app, "/logout", &cookie).await;
        assert!(response.status().is_redirection());

        let target = location(&response);
        assert!(target.starts_with("https://demo.auth0.com/v2/logout"));
        assert!(target.contains("client_id=client-123"));
        assert!(target.contains("returnTo=http%3A%2F%2Flocalhost%3A3000%2F"));

        // Replaying the old cookie must behave as if no session existed:
        // the server-side session is gone even though the cookie is valid.
        let response = get_with_cookie(&app, "/protected", &cookie).await;
        assert!(response.status().is_redirection());
        assert!(location(&response).starts_with("/login"));
    }

    #[tokio::test]
    async fn login_return_to_round_trips_through_callback() {
        let app = test_app();

        let response = get(&app, "/login?return_to=/protected").await;
        assert!(response.status().is_redirection());

        let auth_url = Url::parse(&location(&response)).unwrap();
        let state = auth_url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.to_string())
            .unwrap();

        let uri = format!(
            "/callback?code={}&state={}",
            mock_code("auth0|123", "a@b.com"),
            state
        );
        let response = get(&app, &uri).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/protected");
    }

    #[tokio::test]
    async fn login_rejects_absolute_return_to() {
        let app = test_app();

        let response = get(&app, "/login?return_to=https://evil.com").await;
        assert!(response.status().is_redirection());

        let auth_url = Url::parse(&location(&response)).unwrap();
        let state = auth_url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.to_string())
            .unwrap();

        let uri = format!(
            "/callback?code={}&state={}",
            mock_code("auth0|123", "a@b.com"),
            state
        );
        let response = get(&app, &uri).await;
        // Invalid targets are dropped, landing the user on the home page
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn callback_accepts_form_post() {
        let app = test_app();

        let response = get(&app, "/login").await;
        let auth_url = Url::parse(&location(&response)).unwrap();
        let state = auth_url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.to_string())
            .unwrap();

        let body = format!("code={}&state={}", mock_code("auth0|9", "p@q.r"), state);
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/callback")
                    .header(
                        header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/");
    }
}
