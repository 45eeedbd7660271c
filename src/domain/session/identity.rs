//! Identity provider principals and sign-in state changes.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An authenticated principal as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque provider-side id (not the backend user id).
    pub uid: String,

    /// Provider-verified email address.
    pub email: String,

    /// Display name, when the provider has one.
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            display_name,
        }
    }

    /// Sessions are keyed by email, so an identity without one cannot
    /// start a session.
    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }
}

/// A change in the provider's sign-in state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    SignedIn(Identity),
    SignedOut,
}

impl IdentityEvent {
    /// Returns the identity for `SignedIn` events.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            IdentityEvent::SignedIn(identity) => Some(identity),
            IdentityEvent::SignedOut => None,
        }
    }
}

/// A federated identity provider, named by its provider id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FederatedProvider(String);

impl FederatedProvider {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self(provider_id.into())
    }

    /// Google sign-in, the provider the admin client offers by default.
    pub fn google() -> Self {
        Self::new("google.com")
    }

    pub fn provider_id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Credential handed back by a federated sign-in popup.
#[derive(Debug, Clone)]
pub enum IdpCredential {
    /// OpenID Connect id token issued by the federated provider.
    IdToken(SecretString),
    /// OAuth access token issued by the federated provider.
    AccessToken(SecretString),
}
