//! Mock identity provider for testing.
//!
//! Scripted accounts, a scripted federated result, forced errors, and
//! [`Gate`]s on sign-ins and token fetches so tests can hold an operation
//! while the provider is still answering (an open popup) or between its
//! sign-in and its token refresh. Follows the provider event contract:
//! one `SignedIn` per successful sign-in, one `SignedOut` per successful
//! sign-out. Tests can also inject background events with `emit`.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockIdentityProvider::new()
//!     .with_account("a@b.com", "pw", Identity::new("uid-1", "a@b.com", None));
//! provider.token_gate().close();
//! provider.emit(IdentityEvent::SignedIn(other));
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::adapters::gate::Gate;
use crate::domain::session::{AccessToken, AuthError, FederatedProvider, Identity, IdentityEvent};
use crate::ports::{IdentityEventStream, IdentityProvider};

#[derive(Debug, Clone)]
struct MockAccount {
    password: String,
    identity: Identity,
}

/// Scriptable `IdentityProvider`.
///
/// Tokens are minted as `"{uid}-token-{n}"` with `n` counting up from 1,
/// so a stored token shows which user it was minted for.
#[derive(Debug)]
pub struct MockIdentityProvider {
    accounts: RwLock<HashMap<String, MockAccount>>,
    federated: RwLock<Option<Identity>>,
    current: RwLock<Option<Identity>>,
    sign_in_error: RwLock<Option<AuthError>>,
    token_error: RwLock<Option<AuthError>>,
    sign_out_error: RwLock<Option<AuthError>>,
    sign_in_gate: Gate,
    token_gate: Gate,
    minted: AtomicU64,
    sign_out_calls: AtomicUsize,
    events: mpsc::UnboundedSender<IdentityEvent>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<IdentityEvent>>>,
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        let (events, receiver) = mpsc::unbounded_channel();
        Self {
            accounts: RwLock::new(HashMap::new()),
            federated: RwLock::new(None),
            current: RwLock::new(None),
            sign_in_error: RwLock::new(None),
            token_error: RwLock::new(None),
            sign_out_error: RwLock::new(None),
            sign_in_gate: Gate::opened(),
            token_gate: Gate::opened(),
            minted: AtomicU64::new(0),
            sign_out_calls: AtomicUsize::new(0),
            events,
            receiver: Mutex::new(Some(receiver)),
        }
    }

    /// Registers an email/password account.
    pub fn with_account(self, email: &str, password: &str, identity: Identity) -> Self {
        write(&self.accounts).insert(
            email.to_string(),
            MockAccount {
                password: password.to_string(),
                identity,
            },
        );
        self
    }

    /// The identity a federated popup yields. Without one the popup is
    /// closed by the user and sign-in is `Cancelled`.
    pub fn with_federated_identity(self, identity: Identity) -> Self {
        *write(&self.federated) = Some(identity);
        self
    }

    /// Forces every sign-in to fail with `error`.
    pub fn with_sign_in_error(self, error: AuthError) -> Self {
        *write(&self.sign_in_error) = Some(error);
        self
    }

    /// Forces every token fetch to fail with `error`.
    pub fn with_token_error(self, error: AuthError) -> Self {
        self.set_token_error(Some(error));
        self
    }

    /// Forces `sign_out` to fail with `error` (the user stays signed in).
    pub fn with_sign_out_error(self, error: AuthError) -> Self {
        *write(&self.sign_out_error) = Some(error);
        self
    }

    pub fn set_token_error(&self, error: Option<AuthError>) {
        *write(&self.token_error) = error;
    }

    /// Checkpoint every sign-in passes before answering.
    pub fn sign_in_gate(&self) -> &Gate {
        &self.sign_in_gate
    }

    /// Checkpoint every `get_id_token` call passes before minting.
    pub fn token_gate(&self) -> &Gate {
        &self.token_gate
    }

    /// Injects a provider-initiated event (restored session, revocation).
    pub fn emit(&self, event: IdentityEvent) {
        *write(&self.current) = event.identity().cloned();
        let _ = self.events.send(event);
    }

    pub fn current_user(&self) -> Option<Identity> {
        read(&self.current).clone()
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    fn forced(slot: &RwLock<Option<AuthError>>) -> Result<(), AuthError> {
        match read(slot).clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn sign_in(&self, identity: Identity) -> Identity {
        *write(&self.current) = Some(identity.clone());
        let _ = self.events.send(IdentityEvent::SignedIn(identity.clone()));
        identity
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Identity, AuthError> {
        self.sign_in_gate.pass().await;
        Self::forced(&self.sign_in_error)?;

        let account = read(&self.accounts)
            .get(email)
            .filter(|account| account.password == *password.expose_secret())
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(self.sign_in(account.identity))
    }

    async fn sign_in_with_popup(&self, _provider: &FederatedProvider) -> Result<Identity, AuthError> {
        self.sign_in_gate.pass().await;
        Self::forced(&self.sign_in_error)?;

        let identity = read(&self.federated).clone().ok_or(AuthError::Cancelled)?;
        Ok(self.sign_in(identity))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        Self::forced(&self.sign_out_error)?;

        *write(&self.current) = None;
        let _ = self.events.send(IdentityEvent::SignedOut);
        Ok(())
    }

    async fn get_id_token(&self, _force_refresh: bool) -> Result<AccessToken, AuthError> {
        self.token_gate.pass().await;
        Self::forced(&self.token_error)?;

        let uid = read(&self.current)
            .as_ref()
            .map(|identity| identity.uid.clone())
            .ok_or(AuthError::NotSignedIn)?;
        let n = self.minted.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(AccessToken::new(format!("{}-token-{}", uid, n)))
    }

    fn auth_state_changes(&self) -> Result<IdentityEventStream, AuthError> {
        let receiver = self
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(AuthError::AlreadySubscribed)?;
        Ok(UnboundedReceiverStream::new(receiver).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> Identity {
        Identity::new("uid-1", "a@b.com", Some("Ada".into()))
    }

    fn password(p: &str) -> SecretString {
        SecretString::new(p.into())
    }

    #[tokio::test]
    async fn password_sign_in_checks_password() {
        let provider = MockIdentityProvider::new().with_account("a@b.com", "pw", ada());

        assert_eq!(
            provider.sign_in_with_password("a@b.com", &password("bad")).await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            provider.sign_in_with_password("a@b.com", &password("pw")).await,
            Ok(ada())
        );
        assert_eq!(provider.current_user(), Some(ada()));
    }

    #[tokio::test]
    async fn sign_in_and_out_emit_events() {
        let provider = MockIdentityProvider::new().with_account("a@b.com", "pw", ada());
        let mut events = provider.auth_state_changes().unwrap();

        provider
            .sign_in_with_password("a@b.com", &password("pw"))
            .await
            .unwrap();
        provider.sign_out().await.unwrap();

        assert_eq!(events.next().await, Some(IdentityEvent::SignedIn(ada())));
        assert_eq!(events.next().await, Some(IdentityEvent::SignedOut));
        assert_eq!(provider.sign_out_calls(), 1);
    }

    #[tokio::test]
    async fn popup_without_federated_identity_is_cancelled() {
        let provider = MockIdentityProvider::new();

        assert_eq!(
            provider.sign_in_with_popup(&FederatedProvider::google()).await,
            Err(AuthError::Cancelled)
        );
    }

    #[tokio::test]
    async fn tokens_name_the_current_user() {
        let provider = MockIdentityProvider::new();
        assert!(matches!(
            provider.get_id_token(true).await,
            Err(AuthError::NotSignedIn)
        ));

        provider.emit(IdentityEvent::SignedIn(ada()));

        let first = provider.get_id_token(true).await.unwrap();
        let second = provider.get_id_token(true).await.unwrap();
        assert_eq!(first.expose(), "uid-1-token-1");
        assert_eq!(second.expose(), "uid-1-token-2");
    }

    #[tokio::test]
    async fn failed_sign_out_keeps_user_and_emits_nothing() {
        let provider = MockIdentityProvider::new()
            .with_sign_out_error(AuthError::network("offline"));
        let mut events = provider.auth_state_changes().unwrap();
        provider.emit(IdentityEvent::SignedIn(ada()));

        assert!(provider.sign_out().await.is_err());

        assert_eq!(provider.current_user(), Some(ada()));
        assert_eq!(events.next().await, Some(IdentityEvent::SignedIn(ada())));
        drop(provider);
        assert_eq!(events.next().await, None);
    }
}
