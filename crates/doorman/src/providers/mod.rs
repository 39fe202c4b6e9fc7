//! OIDC provider clients.
//!
//! `Auth0Provider` is the real thing, configured from the tenant's discovery
//! document. `MockProvider` stands in for tests and tenant-less development.

mod auth0;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use auth0::Auth0Provider;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockProvider;
