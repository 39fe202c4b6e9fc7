//! Home and protected page handlers.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use doorman_core::auth::Session;

use crate::extractors::{ClientIp, OptionalSession, RequireSession};

/// Template wrapper that converts askama templates into HTML responses.
struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {err}"),
            )
                .into_response(),
        }
    }
}

/// Home page template, session-aware.
#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    user: Option<HomeUser>,
}

struct HomeUser {
    name: String,
    email: String,
    token_json: String,
}

/// Protected page template.
#[derive(Template)]
#[template(path = "protected.html")]
struct ProtectedTemplate {
    sub: String,
    email: String,
    token_json: String,
}

fn pretty_token(session: &Session) -> String {
    serde_json::to_string_pretty(&session.token).unwrap_or_else(|_| "{}".to_string())
}

/// GET /: landing page, rendered with or without a session.
pub async fn home(OptionalSession(session): OptionalSession) -> impl IntoResponse {
    let user = session.map(|session| {
        let info = &session.token.userinfo;
        HomeUser {
            name: info
                .name
                .clone()
                .or_else(|| info.email.clone())
                .unwrap_or_else(|| info.sub.clone()),
            email: info.email.clone().unwrap_or_default(),
            token_json: pretty_token(&session),
        }
    });

    HtmlTemplate(HomeTemplate { user })
}

/// GET /protected: only reachable with a live session; everyone else is
/// bounced to `/login` by the extractor.
pub async fn protected(
    RequireSession(session): RequireSession,
    ip: ClientIp,
) -> impl IntoResponse {
    let info = &session.token.userinfo;
    tracing::info!(
        client_ip = %ip,
        user_id = %info.sub,
        email = info.email.as_deref().unwrap_or(""),
        "access granted to protected page"
    );

    HtmlTemplate(ProtectedTemplate {
        sub: info.sub.clone(),
        email: info.email.clone().unwrap_or_default(),
        token_json: pretty_token(&session),
    })
}
