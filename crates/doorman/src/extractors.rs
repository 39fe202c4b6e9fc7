//! Axum extractors for session lookup and request metadata.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::cookie::Key;
use axum_extra::extract::SignedCookieJar;
use chrono::Utc;
use doorman_core::auth::{is_session_expired, Session, SessionId};

use crate::state::AppState;

/// Client address for log lines.
///
/// Populated from `ConnectInfo` when the server was started with
/// connect-info support; prints `unknown` otherwise (e.g. in router tests).
pub struct ClientIp(pub Option<SocketAddr>);

impl std::fmt::Display for ClientIp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(addr) => write!(f, "{}", addr.ip()),
            None => write!(f, "unknown"),
        }
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(ClientIp(addr))
    }
}

/// Extractor for the current session, if any. Never rejects.
pub struct OptionalSession(pub Option<Session>);

impl<S> FromRequestParts<S> for OptionalSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        Ok(OptionalSession(lookup_session(parts, &app).await))
    }
}

/// Extractor that gates a route behind a live session.
///
/// A missing or expired session is control flow, not an error: the attempt
/// is logged and the browser is redirected to `/login` with the original
/// path as the return target.
pub struct RequireSession(pub Session);

impl<S> FromRequestParts<S> for RequireSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);

        match lookup_session(parts, &app).await {
            Some(session) => Ok(RequireSession(session)),
            None => {
                let ip = ClientIp(
                    parts
                        .extensions
                        .get::<ConnectInfo<SocketAddr>>()
                        .map(|ConnectInfo(addr)| *addr),
                );
                let path = parts.uri.path();
                tracing::warn!(
                    client_ip = %ip,
                    path = %path,
                    "unauthorized access, redirecting to login"
                );
                Err(Redirect::to(&format!(
                    "/login?return_to={}",
                    urlencoding::encode(path)
                )))
            }
        }
    }
}

/// Resolve the signed session cookie to a stored, unexpired session.
async fn lookup_session(parts: &Parts, app: &AppState) -> Option<Session> {
    let key = Key::from_ref(app);
    let jar = SignedCookieJar::from_headers(&parts.headers, key);
    let cookie = jar.get(&app.config.cookie_name)?;
    let session_id = SessionId::new(cookie.value().to_string());

    let session = app.sessions.get_session(&session_id).await.ok().flatten()?;
    if is_session_expired(&session, Utc::now()) {
        return None;
    }

    Some(session)
}
