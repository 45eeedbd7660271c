//! Federated prompt port - the popup half of a federated sign-in.
//!
//! The identity provider adapter asks the prompt for a credential from
//! the federated provider, then exchanges it for a provider session.

use async_trait::async_trait;

use crate::domain::session::{FederatedProvider, IdpCredential};

/// Obtains a credential from a federated provider.
#[async_trait]
pub trait FederatedPrompt: Send + Sync {
    /// Returns `None` when the user closed the popup.
    async fn prompt(&self, provider: &FederatedProvider) -> Option<IdpCredential>;
}
