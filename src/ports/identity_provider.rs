//! Identity provider port.
//!
//! Wraps the external identity service: password and federated sign-in,
//! sign-out, bearer token retrieval, and the stream of sign-in state
//! changes.
//!
//! # Event contract
//!
//! - Every successful `sign_in_*` call emits exactly one
//!   `IdentityEvent::SignedIn` on the stream.
//! - Every successful `sign_out` call emits exactly one
//!   `IdentityEvent::SignedOut`, whether or not a user was signed in.
//! - The provider may emit on its own (token revocation, restored
//!   persistence); those are background changes.
//! - The stream is unbounded, lazy, and can be taken once per process.
//!   A second `auth_state_changes` call returns
//!   `AuthError::AlreadySubscribed`.

use async_trait::async_trait;
use futures::stream::BoxStream;
use secrecy::SecretString;

use crate::domain::session::{AccessToken, AuthError, FederatedProvider, Identity, IdentityEvent};

/// The single-consumer stream of sign-in state changes.
pub type IdentityEventStream = BoxStream<'static, IdentityEvent>;

/// External identity service.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::InvalidCredentials` for rejected credentials or
///   disabled accounts
/// - Return `AuthError::Cancelled` when the user abandons a federated flow
/// - Return `AuthError::Network` for transport failures and 5xx responses
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in with email and password.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Identity, AuthError>;

    /// Sign in through a federated provider popup/redirect.
    async fn sign_in_with_popup(&self, provider: &FederatedProvider) -> Result<Identity, AuthError>;

    /// Sign the current user out of the provider.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Bearer token for the current user.
    ///
    /// With `force_refresh` the provider must mint a new token rather
    /// than return a cached one. Fails with `NotSignedIn` when no user is
    /// signed in.
    async fn get_id_token(&self, force_refresh: bool) -> Result<AccessToken, AuthError>;

    /// Take the stream of sign-in state changes. Succeeds once.
    fn auth_state_changes(&self) -> Result<IdentityEventStream, AuthError>;
}
