mod error;
mod functions;
mod traits;
mod types;
mod validation;

pub use error::AuthError;
pub use functions::{
    calculate_expiry, generate_session_id, generate_state, is_session_expired, logout_url,
};
pub use traits::{OidcProviderClient, Result, SessionRepository};
pub use types::{AuthFlowState, Session, SessionId, TokenSet, UserInfo};
pub use validation::validate_return_to;
