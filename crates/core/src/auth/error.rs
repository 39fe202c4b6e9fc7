use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid OIDC state parameter")]
    InvalidState,

    #[error("failed to exchange authorization code: {0}")]
    CodeExchange(String),

    #[error("invalid ID token: {0}")]
    InvalidToken(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("provider error: {0}")]
    Provider(String),
}
