use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use doorman_core::auth::AuthError;
use thiserror::Error;

/// Top-level error for the server crate.
///
/// Wraps the core `AuthError` and adds a configuration variant for startup
/// failures. Nothing is recovered here: handlers bubble errors up and this
/// mapping decides the status code.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Auth(AuthError::InvalidState) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Auth(AuthError::InvalidToken(_)) => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AppError::Auth(
                AuthError::CodeExchange(_) | AuthError::Storage(_) | AuthError::Provider(_),
            ) => {
                tracing::error!("auth error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Config(_) => {
                tracing::error!("config error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}
