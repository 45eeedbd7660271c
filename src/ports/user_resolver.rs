//! User resolution port - maps a verified email to the backend user id.

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::domain::session::AuthError;

/// Errors that can occur while resolving a user id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// The backend has no user with this email.
    #[error("No user found for email")]
    NotFound,

    #[error("User lookup failed: {0}")]
    Network(String),

    #[error("Unexpected user lookup response: {0}")]
    InvalidResponse(String),
}

impl From<ResolutionError> for AuthError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::NotFound => AuthError::UserNotFound,
            other => AuthError::Network(other.to_string()),
        }
    }
}

/// Resolves an external identity to the backend's internal user id.
///
/// # Contract
///
/// Implementations must:
/// - Return the id of the first matching user
/// - Return `ResolutionError::NotFound` when there is no match
/// - Return `ResolutionError::Network` for transport failures
#[async_trait]
pub trait UserResolver: Send + Sync {
    async fn resolve_user_id(&self, email: &str) -> Result<UserId, ResolutionError>;
}
