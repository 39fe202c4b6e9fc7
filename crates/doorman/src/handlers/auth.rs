//! Login, callback, and logout handlers.

use axum::{
    extract::{Query, State},
    response::Redirect,
    Form,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::SignedCookieJar;
use chrono::{Duration, Utc};
use doorman_core::auth::{
    calculate_expiry, generate_session_id, generate_state, logout_url, validate_return_to,
    AuthError, AuthFlowState, Session, SessionId,
};
use openidconnect::PkceCodeChallenge;
use serde::Deserialize;

use crate::error::AppError;
use crate::extractors::ClientIp;
use crate::state::AppState;

/// Parameters sent by the provider to the callback, as query string (GET)
/// or form body (POST).
#[derive(Deserialize)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

/// Query parameters for `/login`.
#[derive(Deserialize, Default)]
pub struct LoginQuery {
    /// URL to redirect to after successful authentication.
    pub return_to: Option<String>,
}

/// GET /login: start the OIDC flow.
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    ip: ClientIp,
) -> Result<Redirect, AppError> {
    tracing::info!(client_ip = %ip, "login attempt, redirecting to identity provider");

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
    let csrf_state = generate_state();

    // Validate return_to to prevent open redirects
    let return_to = query
        .return_to
        .as_deref()
        .and_then(validate_return_to)
        .map(String::from);

    // Store the PKCE verifier for the callback
    let flow = AuthFlowState {
        pkce_verifier: pkce_verifier.secret().to_string(),
        created_at: Utc::now(),
        return_to,
    };
    state.sessions.store_auth_flow(&csrf_state, &flow).await?;

    let auth_url = state
        .provider
        .authorization_url(&csrf_state, pkce_challenge.as_str())
        .await?;

    Ok(Redirect::to(auth_url.as_str()))
}

/// GET /callback: provider redirect target.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    complete_login(&state, &params.code, &params.state, jar).await
}

/// POST /callback: same parameters as a form body (`response_mode=form_post`).
pub async fn callback_form(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(params): Form<CallbackParams>,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    complete_login(&state, &params.code, &params.state, jar).await
}

async fn complete_login(
    state: &AppState,
    code: &str,
    csrf_state: &str,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    // The state parameter must match a stored flow, and matches only once.
    let flow = state
        .sessions
        .take_auth_flow(csrf_state)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidState))?;

    // Exchange the code for token material; failures bubble up.
    let token = state
        .provider
        .exchange_code(code, &flow.pkce_verifier)
        .await?;

    let now = Utc::now();
    let session = Session {
        id: generate_session_id(),
        token,
        created_at: now,
        expires_at: calculate_expiry(
            now,
            Duration::seconds(state.config.session_ttl.as_secs() as i64),
        ),
    };
    state.sessions.create_session(&session).await?;

    tracing::info!(
        user_id = %session.token.userinfo.sub,
        email = session.token.userinfo.email.as_deref().unwrap_or(""),
        "login succeeded"
    );

    let cookie = Cookie::build((state.config.cookie_name.clone(), session.id.to_string()))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            state.config.session_ttl.as_secs() as i64
        ))
        .build();
    let jar = jar.add(cookie);

    let redirect_to = flow.return_to.unwrap_or_else(|| "/".to_string());
    Ok((jar, Redirect::to(&redirect_to)))
}

/// GET /logout: clear the session, then hand the browser to the provider's
/// logout endpoint so its own session ends too.
pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    if let Some(cookie) = jar.get(&state.config.cookie_name) {
        let session_id = SessionId::new(cookie.value().to_string());
        state.sessions.delete_session(&session_id).await?;
    }

    // Removal cookie needs the same path as the one set at login
    let removal = Cookie::build((state.config.cookie_name.clone(), String::new()))
        .path("/")
        .build();
    let jar = jar.remove(removal);

    let url = logout_url(
        &state.config.domain,
        &state.config.client_id,
        state.config.base_url.as_str(),
    )?;

    Ok((jar, Redirect::to(url.as_str())))
}
