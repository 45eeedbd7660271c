//! Authentication error types.

use thiserror::Error;

/// Errors reported by the session subsystem to its callers.
///
/// These are domain-centric: identity provider adapters map their wire
/// errors into this taxonomy so the UI never sees provider-specific codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The identity provider rejected the email/password or the account.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The user closed the federated sign-in popup. Recoverable.
    #[error("Sign-in was cancelled")]
    Cancelled,

    /// A network call to the identity provider or backend failed.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend refused the session during validation.
    #[error("Session rejected: {0}")]
    Rejected(String),

    /// A newer sign-in or a sign-out overtook this pipeline run.
    #[error("Superseded by a newer session change")]
    Superseded,

    /// The session store could not be written.
    #[error("Session storage failed: {0}")]
    Storage(String),

    /// The provider signed in an account that has no email address.
    #[error("Identity has no email address")]
    MissingEmail,

    /// The operation needs a signed-in user and there is none.
    #[error("No user is signed in")]
    NotSignedIn,

    /// The backend has no user for the signed-in email.
    #[error("No LMS user matches this account")]
    UserNotFound,

    /// The identity event stream already has its consumer.
    #[error("Identity event stream is already subscribed")]
    AlreadySubscribed,
}

impl AuthError {
    /// Creates a network error with a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Returns true if this error indicates the user should sign in again.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::MissingEmail | AuthError::NotSignedIn
        )
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Network(_) | AuthError::Storage(_))
    }

    /// Text shown to the operator in a failure banner.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Invalid email or password".to_string(),
            AuthError::Cancelled => "Sign-in was cancelled".to_string(),
            AuthError::Network(_) => "Authentication failed: network error".to_string(),
            AuthError::Rejected(reason) => reason.clone(),
            AuthError::Superseded => "Sign-in was interrupted by another session change".to_string(),
            AuthError::Storage(_) => "Could not save the session locally".to_string(),
            AuthError::MissingEmail => "This account has no email address".to_string(),
            AuthError::NotSignedIn => "You are not signed in".to_string(),
            AuthError::UserNotFound => "No LMS user matches this account".to_string(),
            AuthError::AlreadySubscribed => "Authentication Failed".to_string(),
        }
    }
}
